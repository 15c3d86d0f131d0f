//! Allocates under a few tags from several threads and prints the report.
//!
//! Run with: cargo run --example usage_report

use std::thread;

use tagalloc::{memory, MemoryTag, Stopwatch, TrackerConfig};

fn main() {
    let tracker = match tagalloc::init(TrackerConfig::from_env()) {
        Ok(tracker) => tracker,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };

    let mut watch = Stopwatch::new();
    watch.start();

    let texture = memory::allocate(4 * 1024 * 1024, MemoryTag::Texture);
    let strings: Vec<_> = ["engine", "renderer", "scene"]
        .iter()
        .filter_map(|name| tracker.buffer(name.len() * 64, MemoryTag::String))
        .collect();

    thread::scope(|s| {
        for _ in 0..memory::processor_count().min(4) {
            s.spawn(|| {
                let blocks: Vec<_> = (1..=16)
                    .filter_map(|i| memory::allocate(i * 256, MemoryTag::Job))
                    .collect();
                for (i, block) in blocks.into_iter().enumerate() {
                    unsafe { memory::free(block, (i + 1) * 256, MemoryTag::Job) };
                }
            });
        }
    });

    println!("{}", memory::usage_report());

    drop(strings);
    if let Some(texture) = texture {
        unsafe { memory::free(texture, 4 * 1024 * 1024, MemoryTag::Texture) };
    }

    watch.stop();
    println!("{}", memory::usage_report());
    println!(
        "leaked blocks: {}, elapsed: {:.3}ms",
        tracker.check_leaks(),
        watch.elapsed() * 1000.0
    );
}
