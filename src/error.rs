//! Error types for NBT decoding, encoding and world storage operations.
//!
//! This module contains the [`Error`] type which represents every failure that
//! can escape a fallible operation of this crate. Structural problems found by
//! the schema verifier are *not* errors in this sense: they are collected as
//! [`NbtErrors`](crate::NbtErrors) diagnostics and only surface here wrapped in
//! [`Error::Invalid`] when an operation refuses to continue because of them.
//!
//! # Example
//!
//! ```
//! use na_world::{read, Result, Error, BigEndian};
//!
//! fn try_parse(data: &[u8]) -> Result<()> {
//!     match read::<BigEndian>(data) {
//!         Ok(_) => Ok(()),
//!         Err(Error::EndOfFile) => {
//!             println!("Data was truncated");
//!             Err(Error::EndOfFile)
//!         }
//!         Err(Error::InvalidTagType(tag)) => {
//!             println!("Unknown tag type: {:#04x}", tag);
//!             Err(Error::InvalidTagType(tag))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::fmt::{self, Display};

use crate::{NbtErrors, TagID};

/// Alias for a `Result` with the error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// This type represents all possible errors that can occur when reading or
/// writing NBT data, or when touching world storage on disk.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    ///
    /// This typically happens when reading a world file, writing a region
    /// file, or when a [`std::io::Read`] / [`std::io::Write`] implementation
    /// fails.
    IO(std::io::Error),

    /// The input ended unexpectedly.
    ///
    /// This error occurs when the NBT data is truncated or incomplete.
    /// For example, if a compound tag declares a string field but the data
    /// ends before the string content.
    EndOfFile,

    /// Extra bytes remain after parsing the NBT data.
    TrailingData(usize),

    /// An invalid NBT tag type was encountered.
    InvalidTagType(u8),

    /// An array or list declared a negative length.
    NegativeLength(i32),

    /// A list or array has more elements than an i32 length prefix allows.
    ListTooLong(usize),

    /// A list element does not match the list's element type.
    TagMismatch(TagID, TagID),

    /// A string or key is longer than the 65535 bytes a u16 length prefix allows.
    StringTooLong(usize),

    /// Compounds and lists are nested deeper than the reader accepts.
    NestingTooDeep(usize),

    /// A tree was rejected because it failed schema verification.
    Invalid(NbtErrors),

    /// The operation is not available for this world format.
    Unsupported(&'static str),
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IO(error) => formatter.write_str(&error.to_string()),
            Error::EndOfFile => formatter.write_str("unexpected end of input"),
            Error::TrailingData(remaining_bytes) => formatter.write_str(&format!(
                "trailing data after end of input: {remaining_bytes} bytes remaining"
            )),
            Error::InvalidTagType(tag) => {
                formatter.write_str(&format!("invalid NBT tag type: {tag:#04x}"))
            }
            Error::NegativeLength(len) => {
                formatter.write_str(&format!("negative length: {len}"))
            }
            Error::ListTooLong(len) => formatter.write_str(&format!("list length too long: {len}")),
            Error::TagMismatch(expected, actual) => formatter.write_str(&format!(
                "tag in list mismatch: expected {expected}, got {actual}"
            )),
            Error::StringTooLong(len) => {
                formatter.write_str(&format!("string too long: {len} bytes"))
            }
            Error::NestingTooDeep(depth) => {
                formatter.write_str(&format!("nesting deeper than {depth} levels"))
            }
            Error::Invalid(errors) => match errors.errors.first() {
                Some(first) => {
                    formatter.write_str(&format!("verification failed: {errors} First: {first}"))
                }
                None => formatter.write_str(&format!("verification failed: {errors}")),
            },
            Error::Unsupported(what) => formatter.write_str(&format!("unsupported: {what}")),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IO(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}
