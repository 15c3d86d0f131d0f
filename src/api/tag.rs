//! Memory tags.

/// The subsystem an allocation is attributed to.
///
/// Tags carry no behavior; they only select the bucket an allocation is
/// accounted in. The numeric value of every tag is part of the public
/// contract (reporting tools may persist it), so the list is append-only:
/// new tags go at the end and existing values never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum MemoryTag {
    /// For temporary use. Should be replaced by one of the tags below, or a new one.
    Unknown = 0,
    Array = 1,
    LinearAllocator = 2,
    DArray = 3,
    Dict = 4,
    RingQueue = 5,
    Bst = 6,
    String = 7,
    Application = 8,
    Job = 9,
    Texture = 10,
    MaterialInstance = 11,
    Renderer = 12,
    Game = 13,
    Transform = 14,
    Entity = 15,
    EntityNode = 16,
    Scene = 17,
    Resource = 18,
    Vulkan = 19,
    /// "External" Vulkan allocations, for reporting purposes only.
    VulkanExt = 20,
    Direct3D = 21,
    OpenGl = 22,
    /// Representation of GPU-local memory (VRAM).
    GpuLocal = 23,
    BitmapFont = 24,
    SystemFont = 25,
}

impl MemoryTag {
    /// Number of tags. Also the first value that is not a tag.
    pub const COUNT: usize = 26;

    /// Every tag, in numeric order.
    pub const ALL: [MemoryTag; MemoryTag::COUNT] = [
        MemoryTag::Unknown,
        MemoryTag::Array,
        MemoryTag::LinearAllocator,
        MemoryTag::DArray,
        MemoryTag::Dict,
        MemoryTag::RingQueue,
        MemoryTag::Bst,
        MemoryTag::String,
        MemoryTag::Application,
        MemoryTag::Job,
        MemoryTag::Texture,
        MemoryTag::MaterialInstance,
        MemoryTag::Renderer,
        MemoryTag::Game,
        MemoryTag::Transform,
        MemoryTag::Entity,
        MemoryTag::EntityNode,
        MemoryTag::Scene,
        MemoryTag::Resource,
        MemoryTag::Vulkan,
        MemoryTag::VulkanExt,
        MemoryTag::Direct3D,
        MemoryTag::OpenGl,
        MemoryTag::GpuLocal,
        MemoryTag::BitmapFont,
        MemoryTag::SystemFont,
    ];

    /// Table index of this tag (its numeric value).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look a tag up by numeric value.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Upper-case name used in usage reports.
    pub const fn name(self) -> &'static str {
        match self {
            MemoryTag::Unknown => "UNKNOWN",
            MemoryTag::Array => "ARRAY",
            MemoryTag::LinearAllocator => "LINEAR_ALLOC",
            MemoryTag::DArray => "DARRAY",
            MemoryTag::Dict => "DICT",
            MemoryTag::RingQueue => "RING_QUEUE",
            MemoryTag::Bst => "BST",
            MemoryTag::String => "STRING",
            MemoryTag::Application => "APPLICATION",
            MemoryTag::Job => "JOB",
            MemoryTag::Texture => "TEXTURE",
            MemoryTag::MaterialInstance => "MAT_INST",
            MemoryTag::Renderer => "RENDERER",
            MemoryTag::Game => "GAME",
            MemoryTag::Transform => "TRANSFORM",
            MemoryTag::Entity => "ENTITY",
            MemoryTag::EntityNode => "ENTITY_NODE",
            MemoryTag::Scene => "SCENE",
            MemoryTag::Resource => "RESOURCE",
            MemoryTag::Vulkan => "VULKAN",
            MemoryTag::VulkanExt => "VULKAN_EXT",
            MemoryTag::Direct3D => "DIRECT3D",
            MemoryTag::OpenGl => "OPENGL",
            MemoryTag::GpuLocal => "GPU_LOCAL",
            MemoryTag::BitmapFont => "BITMAP_FONT",
            MemoryTag::SystemFont => "SYSTEM_FONT",
        }
    }
}

impl Default for MemoryTag {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for MemoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for MemoryTag {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_numeric_order() {
        for (i, tag) in MemoryTag::ALL.iter().enumerate() {
            assert_eq!(tag.index(), i);
            assert_eq!(MemoryTag::from_index(i), Some(*tag));
        }
        assert_eq!(MemoryTag::from_index(MemoryTag::COUNT), None);
    }

    // Shipped values. Changing any of these breaks persisted reports.
    #[test]
    fn test_numeric_values_are_stable() {
        assert_eq!(MemoryTag::Unknown as u32, 0);
        assert_eq!(MemoryTag::Array as u32, 1);
        assert_eq!(MemoryTag::LinearAllocator as u32, 2);
        assert_eq!(MemoryTag::Dict as u32, 4);
        assert_eq!(MemoryTag::String as u32, 7);
        assert_eq!(MemoryTag::Job as u32, 9);
        assert_eq!(MemoryTag::Texture as u32, 10);
        assert_eq!(MemoryTag::Renderer as u32, 12);
        assert_eq!(MemoryTag::Entity as u32, 15);
        assert_eq!(MemoryTag::GpuLocal as u32, 23);
        assert_eq!(MemoryTag::SystemFont as u32, 25);
        assert_eq!(MemoryTag::COUNT, 26);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(MemoryTag::try_from(10), Ok(MemoryTag::Texture));
        assert_eq!(MemoryTag::try_from(26), Err(26));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = MemoryTag::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MemoryTag::COUNT);
    }
}
