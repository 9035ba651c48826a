use crate::Compression;

/// Tunables applied when a world is opened or created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Number of clean chunks each dimension cache keeps before evicting.
    pub preferred_cache_size: usize,
    /// Compression used when `level.dat` is written back.
    pub level_compression: Compression,
    /// Compression used for chunks written into region files.
    pub chunk_compression: Compression,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            preferred_cache_size: 256,
            level_compression: Compression::Gzip,
            chunk_compression: Compression::Zlib,
        }
    }
}

impl WorldConfig {
    #[inline]
    pub fn with_preferred_cache_size(mut self, size: usize) -> Self {
        self.preferred_cache_size = size;
        self
    }

    #[inline]
    pub fn with_level_compression(mut self, compression: Compression) -> Self {
        self.level_compression = compression;
        self
    }

    #[inline]
    pub fn with_chunk_compression(mut self, compression: Compression) -> Self {
        self.chunk_compression = compression;
        self
    }
}
