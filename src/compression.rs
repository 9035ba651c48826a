//! Compression transforms applied at the file boundary.
//!
//! World files are stored gzip-compressed (`level.dat`, legacy chunk files)
//! or zlib-compressed (chunks inside region files). Decoding detects the
//! format from the leading magic bytes; encoding uses whatever the caller
//! configured.

use std::io::{Read, Write};

use flate2::{
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
};

use crate::{ByteOrder, Error, NamedTag, Result, read, write};

/// Compression type of a stored NBT document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    None,
    #[default]
    Gzip,
    Zlib,
}

impl Compression {
    /// Detects the compression type from the first bytes of data.
    pub fn detect(data: &[u8]) -> Self {
        if data.len() >= 2 {
            // Gzip magic: 0x1f 0x8b
            if data[0] == 0x1f && data[1] == 0x8b {
                return Compression::Gzip;
            }
            // Zlib magic: 0x78 followed by 0x01, 0x5e, 0x9c, or 0xda
            if data[0] == 0x78 && matches!(data[1], 0x01 | 0x5e | 0x9c | 0xda) {
                return Compression::Zlib;
            }
        }
        Compression::None
    }

    /// Region files tag each chunk payload with one of these ids.
    pub const fn region_id(self) -> u8 {
        match self {
            Compression::Gzip => 1,
            Compression::Zlib => 2,
            Compression::None => 3,
        }
    }

    pub const fn from_region_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Zlib),
            3 => Some(Compression::None),
            _ => None,
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 4);
        match self {
            Compression::None => out.extend_from_slice(data),
            Compression::Gzip => {
                GzDecoder::new(data).read_to_end(&mut out).map_err(Error::IO)?;
            }
            Compression::Zlib => {
                ZlibDecoder::new(data).read_to_end(&mut out).map_err(Error::IO)?;
            }
        }
        Ok(out)
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(Error::IO)?;
                encoder.finish().map_err(Error::IO)
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(Error::IO)?;
                encoder.finish().map_err(Error::IO)
            }
        }
    }
}

/// Decodes a document whose compression is detected from its magic bytes.
pub fn read_compressed<O: ByteOrder>(data: &[u8]) -> Result<NamedTag> {
    match Compression::detect(data) {
        Compression::None => read::<O>(data),
        compression => read::<O>(&compression.decompress(data)?),
    }
}

/// Encodes `root` and compresses the result.
pub fn write_compressed<O: ByteOrder>(root: &NamedTag, compression: Compression) -> Result<Vec<u8>> {
    compression.compress(&write::<O>(root)?)
}
