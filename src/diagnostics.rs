//! Structured verification diagnostics.
//!
//! [`NbtErrors`] partitions findings into fatal `errors` and informational
//! `warnings`. Each [`NbtError`] carries the path from the tree root to the
//! offending node.

use std::fmt::{self, Display};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NbtErrorKind {
    Exception,
    IoError,
    InvalidVersion,
    MissingTag,
    InvalidTagType,
    InvalidTagValue,
    UnexpectedTag,
}

impl NbtErrorKind {
    /// Warnings are reported but never cause a tree to be rejected.
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::UnexpectedTag)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Exception => "Exception",
            Self::IoError => "IOError",
            Self::InvalidVersion => "InvalidVersion",
            Self::MissingTag => "MissingTag",
            Self::InvalidTagType => "InvalidTagType",
            Self::InvalidTagValue => "InvalidTagValue",
            Self::UnexpectedTag => "UnexpectedTag",
        }
    }
}

impl Display for NbtErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding, located by its path from the root.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NbtError {
    pub kind: NbtErrorKind,
    pub path: Vec<String>,
    pub message: String,
}

impl NbtError {
    pub fn new(kind: NbtErrorKind, path: &[String], message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// Slash-delimited path, `/` for the root.
    pub fn path_string(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

impl Display for NbtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.path_string(), self.message)
    }
}

/// Errors and warnings collected by one verification or open attempt.
///
/// `errors` reject, `warnings` only inform. Success means no errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NbtErrors {
    pub errors: Vec<NbtError>,
    pub warnings: Vec<NbtError>,
}

impl NbtErrors {
    #[inline]
    pub fn new(errors: Vec<NbtError>, warnings: Vec<NbtError>) -> Self {
        Self { errors, warnings }
    }

    /// A single root-level finding, filed as a warning or error by its kind.
    pub fn from_message(kind: NbtErrorKind, message: impl Into<String>) -> Self {
        let error = NbtError::new(kind, &[], message);
        if kind.is_warning() {
            Self::new(Vec::new(), vec![error])
        } else {
            Self::new(vec![error], Vec::new())
        }
    }

    /// Converts an unexpected failure into the diagnostic taxonomy.
    ///
    /// I/O failures map to [`NbtErrorKind::IoError`], verification failures
    /// are passed through, and everything else is an
    /// [`NbtErrorKind::Exception`].
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::IO(_) => Self::from_message(NbtErrorKind::IoError, error.to_string()),
            Error::Invalid(errors) => errors.clone(),
            _ => Self::from_message(NbtErrorKind::Exception, error.to_string()),
        }
    }

    pub fn with_error(mut self, kind: NbtErrorKind, message: impl Into<String>) -> Self {
        self.errors.push(NbtError::new(kind, &[], message));
        self
    }

    pub fn with_warning(mut self, kind: NbtErrorKind, message: impl Into<String>) -> Self {
        self.warnings.push(NbtError::new(kind, &[], message));
        self
    }

    /// Appends everything from `other`, keeping its partition.
    pub fn extend(&mut self, other: NbtErrors) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if any error or warning has the given kind.
    pub fn has_kind(&self, kind: NbtErrorKind) -> bool {
        self.iter().any(|error| error.kind == kind)
    }

    /// Errors first, then warnings.
    pub fn iter(&self) -> impl Iterator<Item = &NbtError> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

impl Display for NbtErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Success");
        }
        write!(
            f,
            "{} Errors, {} Warnings.",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

impl std::error::Error for NbtErrors {}
