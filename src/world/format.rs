use std::fmt::{self, Display};

use crate::ChunkLayout;

/// Version stamped into `Data/version` by Anvil worlds.
pub const ANVIL_VERSION: i32 = 19133;
/// Version stamped into `Data/version` by Beta worlds.
pub const BETA_VERSION: i32 = 19132;

/// On-disk world layouts, newest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldFormat {
    /// Region files (`.mca`) holding sectioned chunks.
    Anvil,
    /// Region files (`.mcr`) holding flat 128-high chunks.
    Beta,
    /// One gzip file per chunk, no version field.
    Alpha,
}

impl WorldFormat {
    /// Order in which [`NbtWorld::open`](crate::NbtWorld::open) tries formats.
    pub const ALL: [WorldFormat; 3] = [WorldFormat::Anvil, WorldFormat::Beta, WorldFormat::Alpha];

    /// Required `Data/version`; `None` means the field must be absent.
    pub const fn version(self) -> Option<i32> {
        match self {
            WorldFormat::Anvil => Some(ANVIL_VERSION),
            WorldFormat::Beta => Some(BETA_VERSION),
            WorldFormat::Alpha => None,
        }
    }

    pub const fn region_extension(self) -> Option<&'static str> {
        match self {
            WorldFormat::Anvil => Some("mca"),
            WorldFormat::Beta => Some("mcr"),
            WorldFormat::Alpha => None,
        }
    }

    #[inline]
    pub const fn uses_regions(self) -> bool {
        self.region_extension().is_some()
    }

    pub const fn chunk_layout(self) -> ChunkLayout {
        match self {
            WorldFormat::Anvil => ChunkLayout::Sectioned,
            WorldFormat::Beta | WorldFormat::Alpha => ChunkLayout::Legacy,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WorldFormat::Anvil => "Anvil",
            WorldFormat::Beta => "Beta",
            WorldFormat::Alpha => "Alpha",
        }
    }

    /// Whether a document carrying `version` belongs to this format.
    #[inline]
    pub fn accepts_version(self, version: Option<i32>) -> bool {
        self.version() == version
    }
}

impl Display for WorldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
