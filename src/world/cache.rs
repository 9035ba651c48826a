use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use lru::LruCache;

use crate::{Chunk, ChunkPos};

/// Shared handle to a cached chunk.
pub type ChunkRef = Rc<RefCell<Chunk>>;

/// Per-dimension chunk cache.
///
/// Clean chunks live in an LRU bounded by the preferred size. Dirty chunks
/// are held separately and never evicted, so unsaved edits survive until the
/// next save.
pub struct ChunkCache {
    capacity: usize,
    clean: LruCache<ChunkPos, ChunkRef>,
    dirty: IndexMap<ChunkPos, ChunkRef>,
}

impl ChunkCache {
    pub fn new(preferred_size: usize) -> Self {
        Self {
            capacity: preferred_size,
            clean: LruCache::unbounded(),
            dirty: IndexMap::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Looks up a chunk, refreshing its recency when clean.
    pub fn get(&mut self, pos: ChunkPos) -> Option<ChunkRef> {
        if let Some(chunk) = self.dirty.get(&pos) {
            return Some(chunk.clone());
        }
        self.clean.get(&pos).cloned()
    }

    #[inline]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.dirty.contains_key(&pos) || self.clean.contains(&pos)
    }

    /// Caches a chunk as clean, evicting the least recently used clean
    /// chunks beyond the preferred size.
    pub fn insert(&mut self, chunk: ChunkRef) {
        let pos = chunk.borrow().pos();
        if self.dirty.contains_key(&pos) {
            self.dirty.insert(pos, chunk);
            return;
        }
        self.clean.put(pos, chunk);
        while self.clean.len() > self.capacity {
            if self.clean.pop_lru().is_none() {
                break;
            }
        }
    }

    /// Caches a chunk as dirty.
    pub fn insert_dirty(&mut self, chunk: ChunkRef) {
        let pos = chunk.borrow().pos();
        self.clean.pop(&pos);
        self.dirty.insert(pos, chunk);
    }

    /// Moves a cached chunk to the dirty set. Returns `false` if it is not cached.
    pub fn mark_dirty(&mut self, pos: ChunkPos) -> bool {
        if self.dirty.contains_key(&pos) {
            return true;
        }
        match self.clean.pop(&pos) {
            Some(chunk) => {
                self.dirty.insert(pos, chunk);
                true
            }
            None => false,
        }
    }

    /// Moves a saved chunk back to the clean set.
    pub fn mark_clean(&mut self, pos: ChunkPos) {
        if let Some(chunk) = self.dirty.shift_remove(&pos) {
            self.insert(chunk);
        }
    }

    #[inline]
    pub fn is_dirty(&self, pos: ChunkPos) -> bool {
        self.dirty.contains_key(&pos)
    }

    /// Dirty chunks in the order they were first dirtied.
    pub fn dirty_chunks(&self) -> Vec<ChunkRef> {
        self.dirty.values().cloned().collect()
    }

    pub fn remove(&mut self, pos: ChunkPos) -> Option<ChunkRef> {
        self.dirty
            .shift_remove(&pos)
            .or_else(|| self.clean.pop(&pos))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clean.len() + self.dirty.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn clean_len(&self) -> usize {
        self.clean.len()
    }

    #[inline]
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Drops every clean chunk. Dirty chunks are kept.
    pub fn clear(&mut self) {
        self.clean.clear();
    }
}
