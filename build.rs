//! Build script for tagalloc.
//!
//! Warns about feature combinations that are easy to ship by accident.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEBUG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_CHECKED");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_FFI");

    let debug_enabled = env::var("CARGO_FEATURE_DEBUG").is_ok();
    let checked_enabled = env::var("CARGO_FEATURE_CHECKED").is_ok();
    let ffi_enabled = env::var("CARGO_FEATURE_FFI").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    if is_release && debug_enabled {
        emit_warning("'debug' feature enabled in release build!");
        emit_note("Every allocation captures a backtrace. Disable for production.");
    } else if is_release && checked_enabled {
        emit_info("Checked mode is on in release: every free is validated");
    }

    if ffi_enabled {
        emit_info("C API enabled (tagalloc_* symbols)");
    }

    if env::var("TARGET").map(|t| t.contains("wasm")).unwrap_or(false) {
        emit_warning("WebAssembly target detected");
        emit_note("sleep() blocks the only thread on wasm32-unknown-unknown.");
    }
}

fn emit_info(msg: &str) {
    println!("cargo:warning=[tagalloc] {}", msg);
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[tagalloc]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[tagalloc] warning: {}", msg);
}
