//! Chunk-per-file storage used by Alpha worlds.
//!
//! Chunk `(x, z)` lives at `<dir>/<x mod 64>/<z mod 64>/c.<x>.<z>.dat`, every
//! component written in base 36, each file a gzip-compressed NBT document.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bytes::Bytes;

use crate::{ChunkStore, Compression, Result};

/// Formats `value` in lower-case base 36 with a leading `-` when negative.
pub fn base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&digit| digit as char).collect()
}

pub struct AlphaChunkStore {
    dir: PathBuf,
    compression: Compression,
}

impl AlphaChunkStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            compression: Compression::Gzip,
        }
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn chunk_path(&self, x: i32, z: i32) -> PathBuf {
        self.dir
            .join(base36(i64::from(x.rem_euclid(64))))
            .join(base36(i64::from(z.rem_euclid(64))))
            .join(format!("c.{}.{}.dat", base36(x.into()), base36(z.into())))
    }
}

impl ChunkStore for AlphaChunkStore {
    fn read_chunk(&mut self, x: i32, z: i32) -> Result<Option<Bytes>> {
        let raw = match fs::read(self.chunk_path(x, z)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data = Compression::detect(&raw).decompress(&raw)?;
        Ok(Some(Bytes::from(data)))
    }

    fn write_chunk(&mut self, x: i32, z: i32, data: &[u8]) -> Result<()> {
        let path = self.chunk_path(x, z);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.compression.compress(data)?)?;
        Ok(())
    }

    fn delete_chunk(&mut self, x: i32, z: i32) -> Result<bool> {
        match fs::remove_file(self.chunk_path(x, z)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn chunk_exists(&mut self, x: i32, z: i32) -> Result<bool> {
        Ok(self.chunk_path(x, z).is_file())
    }
}
