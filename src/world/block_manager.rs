use std::rc::Rc;

use crate::{CHUNK_WIDTH, ChunkManager, Result};

/// Blocks addressed by global world coordinates.
pub struct BlockManager {
    chunks: Rc<ChunkManager>,
}

#[inline]
fn split(x: i32, z: i32) -> (i32, i32, i32, i32) {
    (
        x.div_euclid(CHUNK_WIDTH),
        z.div_euclid(CHUNK_WIDTH),
        x.rem_euclid(CHUNK_WIDTH),
        z.rem_euclid(CHUNK_WIDTH),
    )
}

impl BlockManager {
    pub fn new(chunks: Rc<ChunkManager>) -> Self {
        Self { chunks }
    }

    #[inline]
    pub fn chunk_manager(&self) -> &Rc<ChunkManager> {
        &self.chunks
    }

    /// World height of this dimension's chunk layout.
    #[inline]
    pub fn height(&self) -> i32 {
        self.chunks.layout().height()
    }

    /// Block id at `(x, y, z)`; `None` when the chunk does not exist or `y`
    /// is out of range.
    pub fn block_id(&self, x: i32, y: i32, z: i32) -> Result<Option<u8>> {
        let (chunk_x, chunk_z, local_x, local_z) = split(x, z);
        let Some(chunk) = self.chunks.get_chunk(chunk_x, chunk_z)? else {
            return Ok(None);
        };
        Ok(chunk.borrow().block_id(local_x, y, local_z))
    }

    /// Sets the block at `(x, y, z)`, creating its chunk if needed, and marks
    /// the chunk dirty. Returns `false` when `y` is out of range.
    pub fn set_block_id(&self, x: i32, y: i32, z: i32, id: u8) -> Result<bool> {
        if !(0..self.height()).contains(&y) {
            return Ok(false);
        }
        let (chunk_x, chunk_z, local_x, local_z) = split(x, z);
        let chunk = match self.chunks.get_chunk(chunk_x, chunk_z)? {
            Some(chunk) => chunk,
            None => self.chunks.create_chunk(chunk_x, chunk_z),
        };
        let changed = chunk.borrow_mut().set_block_id(local_x, y, local_z, id);
        if changed {
            self.chunks.mark_chunk_dirty(&chunk);
        }
        Ok(changed)
    }
}
