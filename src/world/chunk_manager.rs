use std::{cell::RefCell, rc::Rc};

use tracing::{debug, warn};

use crate::{
    BigEndian, Chunk, ChunkCache, ChunkLayout, ChunkPos, ChunkRef, ChunkStore, Result, read,
    write,
};

/// Typed chunk access for one dimension.
///
/// Reads go through the shared [`ChunkCache`]. Edits stay in memory until
/// [`ChunkManager::save`] writes every dirty chunk back to the store.
pub struct ChunkManager {
    store: Rc<RefCell<dyn ChunkStore>>,
    cache: Rc<RefCell<ChunkCache>>,
    layout: ChunkLayout,
}

impl ChunkManager {
    pub fn new(
        store: Rc<RefCell<dyn ChunkStore>>,
        cache: Rc<RefCell<ChunkCache>>,
        layout: ChunkLayout,
    ) -> Self {
        Self {
            store,
            cache,
            layout,
        }
    }

    #[inline]
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    #[inline]
    pub fn cache(&self) -> &Rc<RefCell<ChunkCache>> {
        &self.cache
    }

    /// Loads a chunk, `None` if nothing is stored at `(x, z)`.
    ///
    /// Chunks that fail verification are rejected with
    /// [`Error::Invalid`](crate::Error::Invalid).
    pub fn get_chunk(&self, x: i32, z: i32) -> Result<Option<ChunkRef>> {
        let pos = ChunkPos::new(x, z);
        if let Some(chunk) = self.cache.borrow_mut().get(pos) {
            return Ok(Some(chunk));
        }

        let Some(data) = self.store.borrow_mut().read_chunk(x, z)? else {
            return Ok(None);
        };
        let tree = read::<BigEndian>(&data)?;
        let (chunk, report) = match Chunk::from_tree(pos, self.layout, tree) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("rejected chunk ({x}, {z}): {e}");
                return Err(e);
            }
        };
        for warning in &report.warnings {
            warn!("chunk ({x}, {z}): {warning}");
        }

        let chunk = Rc::new(RefCell::new(chunk));
        self.cache.borrow_mut().insert(chunk.clone());
        Ok(Some(chunk))
    }

    /// Creates an empty chunk at `(x, z)`, replacing any cached one. The new
    /// chunk is dirty.
    pub fn create_chunk(&self, x: i32, z: i32) -> ChunkRef {
        let chunk = Rc::new(RefCell::new(Chunk::new(ChunkPos::new(x, z), self.layout)));
        self.cache.borrow_mut().insert_dirty(chunk.clone());
        debug!("created chunk ({x}, {z})");
        chunk
    }

    pub fn chunk_exists(&self, x: i32, z: i32) -> Result<bool> {
        if self.cache.borrow().contains(ChunkPos::new(x, z)) {
            return Ok(true);
        }
        self.store.borrow_mut().chunk_exists(x, z)
    }

    /// Removes a chunk from the cache and the store, discarding unsaved edits.
    pub fn delete_chunk(&self, x: i32, z: i32) -> Result<bool> {
        let cached = self.cache.borrow_mut().remove(ChunkPos::new(x, z)).is_some();
        let stored = self.store.borrow_mut().delete_chunk(x, z)?;
        Ok(cached || stored)
    }

    /// Flags a cached chunk for the next save. Returns `false` if the chunk
    /// is not cached.
    pub fn mark_dirty(&self, x: i32, z: i32) -> bool {
        self.cache.borrow_mut().mark_dirty(ChunkPos::new(x, z))
    }

    /// Flags a chunk handle for the next save, re-caching it if it was
    /// evicted meanwhile.
    pub fn mark_chunk_dirty(&self, chunk: &ChunkRef) {
        self.cache.borrow_mut().insert_dirty(chunk.clone());
    }

    /// Writes every dirty chunk and returns how many were written.
    pub fn save(&self) -> Result<usize> {
        let dirty = self.cache.borrow().dirty_chunks();
        let mut saved = 0;
        for chunk in dirty {
            let (pos, data) = {
                let chunk = chunk.borrow();
                (chunk.pos(), write::<BigEndian>(chunk.tree())?)
            };
            self.store.borrow_mut().write_chunk(pos.x, pos.z, &data)?;
            self.cache.borrow_mut().mark_clean(pos);
            saved += 1;
        }
        if saved > 0 {
            debug!("saved {saved} chunks");
        }
        Ok(saved)
    }
}
