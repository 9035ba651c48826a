use bytes::Bytes;

use crate::Result;

/// Raw chunk persistence, addressed by chunk coordinates.
///
/// Payloads are uncompressed NBT documents; compression is the store's
/// business.
pub trait ChunkStore {
    /// Returns `None` when no chunk is stored at `(x, z)`.
    fn read_chunk(&mut self, x: i32, z: i32) -> Result<Option<Bytes>>;

    fn write_chunk(&mut self, x: i32, z: i32, data: &[u8]) -> Result<()>;

    /// Returns `false` when there was nothing to delete.
    fn delete_chunk(&mut self, x: i32, z: i32) -> Result<bool>;

    fn chunk_exists(&mut self, x: i32, z: i32) -> Result<bool>;
}
