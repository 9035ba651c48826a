//! Region files: 32×32 chunks packed into one file.
//!
//! - Bytes 0-4095: location table (1024 entries × 4 bytes, sector offset << 8 | sector count)
//! - Bytes 4096-8191: timestamp table (1024 entries × 4 bytes)
//! - Bytes 8192+: chunk payloads, each starting on a sector boundary
//!
//! A payload is a big-endian `u32` length, one compression byte and the
//! compressed NBT document. The length counts the compression byte.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use tracing::debug;
use zerocopy::{BigEndian, byteorder};

use crate::{ChunkStore, Compression, Error, Result};

/// Size of one sector in bytes (4 KB).
pub const SECTOR_SIZE: usize = 4096;

/// Total header size (location table + timestamp table).
pub const HEADER_SIZE: usize = SECTOR_SIZE * 2;

/// Number of chunks per region dimension.
pub const REGION_SIZE: i32 = 32;

/// Chunks per region file, and entries in each header table.
pub const CHUNK_COUNT: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Largest run of sectors one location entry can describe.
const MAX_CHUNK_SECTORS: usize = u8::MAX as usize;

/// Convert chunk coordinates to local region coordinates (0-31).
#[inline]
pub fn chunk_to_local(chunk_coord: i32) -> i32 {
    chunk_coord.rem_euclid(REGION_SIZE)
}

/// Convert chunk coordinates to region coordinates.
#[inline]
pub fn chunk_to_region(chunk_coord: i32) -> i32 {
    chunk_coord.div_euclid(REGION_SIZE)
}

/// Calculate linear index for a chunk within a region (0-1023).
#[inline]
pub fn local_to_index(local_x: i32, local_z: i32) -> usize {
    (local_z * REGION_SIZE + local_x) as usize
}

#[inline]
fn chunk_index(chunk_x: i32, chunk_z: i32) -> usize {
    local_to_index(chunk_to_local(chunk_x), chunk_to_local(chunk_z))
}

/// Region file coordinates (parsed from filename like "r.0.-1.mca").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region holding the given chunk.
    pub fn containing(chunk_x: i32, chunk_z: i32) -> Self {
        Self::new(chunk_to_region(chunk_x), chunk_to_region(chunk_z))
    }

    /// Parse region position from filename (e.g., "r.0.-1.mca").
    pub fn from_filename(name: &str, extension: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" && parts[3] == extension {
            let x = parts[1].parse().ok()?;
            let z = parts[2].parse().ok()?;
            Some(Self { x, z })
        } else {
            None
        }
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("r.{}.{}.{extension}", self.x, self.z)
    }

    /// Convert local chunk coordinates to world chunk coordinates.
    pub fn local_to_world(&self, local_x: i32, local_z: i32) -> (i32, i32) {
        (
            self.x * REGION_SIZE + local_x,
            self.z * REGION_SIZE + local_z,
        )
    }
}

fn corrupt(message: &'static str) -> Error {
    Error::IO(io::Error::new(io::ErrorKind::InvalidData, message))
}

fn be_u32(raw: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[..4]);
    byteorder::U32::<BigEndian>::from_bytes(bytes).get()
}

/// One open region file. Chunk coordinates passed in may be world
/// coordinates; only their position inside the region is used.
pub struct RegionFile {
    path: PathBuf,
    file: File,
    locations: Vec<u32>,
    timestamps: Vec<u32>,
    sectors: usize,
}

impl RegionFile {
    /// Opens `path`, creating an empty region if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len() as usize;
        let mut header = vec![0u8; HEADER_SIZE];
        if len < HEADER_SIZE {
            file.set_len(HEADER_SIZE as u64)?;
        } else {
            file.read_exact(&mut header)?;
        }

        let (location_table, timestamp_table) = header.split_at(CHUNK_COUNT * 4);
        let locations = location_table.chunks_exact(4).map(be_u32).collect();
        let timestamps = timestamp_table.chunks_exact(4).map(be_u32).collect();
        debug!("opened region file {}", path.display());

        Ok(Self {
            path,
            file,
            locations,
            timestamps,
            sectors: len.max(HEADER_SIZE).div_ceil(SECTOR_SIZE),
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn has_chunk(&self, chunk_x: i32, chunk_z: i32) -> bool {
        self.locations[chunk_index(chunk_x, chunk_z)] != 0
    }

    /// Number of occupied chunk slots.
    pub fn chunk_count(&self) -> usize {
        self.locations.iter().filter(|&&location| location != 0).count()
    }

    /// Seconds since the epoch at which the chunk was last written.
    #[inline]
    pub fn timestamp(&self, chunk_x: i32, chunk_z: i32) -> u32 {
        self.timestamps[chunk_index(chunk_x, chunk_z)]
    }

    /// Reads and decompresses one chunk document, `None` if the slot is empty.
    pub fn read_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<Option<Vec<u8>>> {
        let location = self.locations[chunk_index(chunk_x, chunk_z)];
        if location == 0 {
            return Ok(None);
        }
        let offset = (location >> 8) as usize;
        let count = (location & 0xff) as usize;
        if offset < HEADER_SIZE / SECTOR_SIZE || offset + count > self.sectors {
            return Err(corrupt("chunk sectors lie outside the region file"));
        }

        self.file.seek(SeekFrom::Start((offset * SECTOR_SIZE) as u64))?;
        let mut head = [0u8; 5];
        self.file.read_exact(&mut head)?;
        let length = be_u32(&head) as usize;
        if length == 0 || length + 4 > count * SECTOR_SIZE {
            return Err(corrupt("chunk length exceeds its sectors"));
        }
        let compression =
            Compression::from_region_id(head[4]).ok_or(Error::Unsupported("chunk compression"))?;

        let mut payload = vec![0u8; length - 1];
        self.file.read_exact(&mut payload)?;
        compression.decompress(&payload).map(Some)
    }

    /// Compresses and stores one chunk document, reusing its sectors when
    /// the new payload still fits.
    pub fn write_chunk(
        &mut self,
        chunk_x: i32,
        chunk_z: i32,
        data: &[u8],
        compression: Compression,
    ) -> Result<()> {
        let index = chunk_index(chunk_x, chunk_z);
        let payload = compression.compress(data)?;
        let needed = (payload.len() + 5).div_ceil(SECTOR_SIZE);
        if needed > MAX_CHUNK_SECTORS {
            return Err(Error::Unsupported("chunk larger than 255 sectors"));
        }

        let location = self.locations[index];
        let offset = if location != 0 && needed <= (location & 0xff) as usize {
            (location >> 8) as usize
        } else {
            self.allocate(needed, index)
        };

        let mut buf = Vec::with_capacity(needed * SECTOR_SIZE);
        buf.extend_from_slice(&byteorder::U32::<BigEndian>::new(payload.len() as u32 + 1).to_bytes());
        buf.push(compression.region_id());
        buf.extend_from_slice(&payload);
        buf.resize(needed * SECTOR_SIZE, 0);

        self.file.seek(SeekFrom::Start((offset * SECTOR_SIZE) as u64))?;
        self.file.write_all(&buf)?;
        self.sectors = self.sectors.max(offset + needed);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs() as u32);
        self.set_header(index, ((offset as u32) << 8) | needed as u32, timestamp)
    }

    /// Frees a chunk slot. Returns `false` if it was already empty.
    pub fn delete_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<bool> {
        let index = chunk_index(chunk_x, chunk_z);
        if self.locations[index] == 0 {
            return Ok(false);
        }
        self.set_header(index, 0, 0)?;
        Ok(true)
    }

    /// First run of `needed` free sectors, ignoring the slot being rewritten.
    fn allocate(&self, needed: usize, rewriting: usize) -> usize {
        let mut used = vec![false; self.sectors];
        used[..HEADER_SIZE / SECTOR_SIZE].fill(true);
        for (index, &location) in self.locations.iter().enumerate() {
            if location == 0 || index == rewriting {
                continue;
            }
            let offset = (location >> 8) as usize;
            let count = (location & 0xff) as usize;
            for slot in used.iter_mut().skip(offset).take(count) {
                *slot = true;
            }
        }

        let mut run = 0;
        for (sector, &taken) in used.iter().enumerate() {
            if taken {
                run = 0;
                continue;
            }
            run += 1;
            if run == needed {
                return sector + 1 - needed;
            }
        }
        // extend the trailing free run past the end of the file
        self.sectors - run
    }

    fn set_header(&mut self, index: usize, location: u32, timestamp: u32) -> Result<()> {
        self.locations[index] = location;
        self.timestamps[index] = timestamp;

        self.file.seek(SeekFrom::Start((index * 4) as u64))?;
        self.file.write_all(&byteorder::U32::<BigEndian>::new(location).to_bytes())?;
        self.file.seek(SeekFrom::Start((SECTOR_SIZE + index * 4) as u64))?;
        self.file.write_all(&byteorder::U32::<BigEndian>::new(timestamp).to_bytes())?;
        Ok(())
    }
}

/// Maps chunk coordinates onto the region files of one dimension.
pub struct RegionManager {
    dir: PathBuf,
    extension: &'static str,
    compression: Compression,
    regions: HashMap<RegionPos, RegionFile>,
}

impl RegionManager {
    pub fn new(dir: impl Into<PathBuf>, extension: &'static str, compression: Compression) -> Self {
        Self {
            dir: dir.into(),
            extension,
            compression,
            regions: HashMap::new(),
        }
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    #[inline]
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn region_path(&self, pos: RegionPos) -> PathBuf {
        self.dir.join(pos.file_name(self.extension))
    }

    pub fn region_exists(&self, pos: RegionPos) -> bool {
        self.regions.contains_key(&pos) || self.region_path(pos).is_file()
    }

    /// The region at `pos`, opened (and created on disk) on first use.
    pub fn region(&mut self, pos: RegionPos) -> Result<&mut RegionFile> {
        let path = self.region_path(pos);
        Ok(match self.regions.entry(pos) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(RegionFile::open(path)?),
        })
    }

    /// Regions present on disk, in directory order.
    pub fn regions(&self) -> Result<Vec<RegionPos>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(pos) = name
                .to_str()
                .and_then(|name| RegionPos::from_filename(name, self.extension))
            {
                found.push(pos);
            }
        }
        Ok(found)
    }

    pub fn delete_region(&mut self, pos: RegionPos) -> Result<bool> {
        self.regions.remove(&pos);
        let path = self.region_path(pos);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

impl ChunkStore for RegionManager {
    fn read_chunk(&mut self, x: i32, z: i32) -> Result<Option<Bytes>> {
        let pos = RegionPos::containing(x, z);
        if !self.region_exists(pos) {
            return Ok(None);
        }
        Ok(self.region(pos)?.read_chunk(x, z)?.map(Bytes::from))
    }

    fn write_chunk(&mut self, x: i32, z: i32, data: &[u8]) -> Result<()> {
        let compression = self.compression;
        self.region(RegionPos::containing(x, z))?
            .write_chunk(x, z, data, compression)
    }

    fn delete_chunk(&mut self, x: i32, z: i32) -> Result<bool> {
        let pos = RegionPos::containing(x, z);
        if !self.region_exists(pos) {
            return Ok(false);
        }
        self.region(pos)?.delete_chunk(x, z)
    }

    fn chunk_exists(&mut self, x: i32, z: i32) -> Result<bool> {
        let pos = RegionPos::containing(x, z);
        if !self.region_exists(pos) {
            return Ok(false);
        }
        Ok(self.region(pos)?.has_chunk(x, z))
    }
}
