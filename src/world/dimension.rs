use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use crate::is_plain_name;

/// Canonical key of a world partition.
///
/// Numeric dimensions are stored under `DIM<id>`; id `0` and the empty name
/// both denote the default dimension, which lives at the world root.
///
/// ```
/// use na_world::Dimension;
///
/// assert_eq!(Dimension::from("DIM0"), Dimension::Default);
/// assert_eq!(Dimension::from(-1), Dimension::NETHER);
/// assert_eq!(Dimension::from("DIM-1").to_string(), "DIM-1");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    #[default]
    Default,
    Id(i32),
    Named(String),
}

impl Dimension {
    pub const NETHER: Dimension = Dimension::Id(-1);
    pub const THE_END: Dimension = Dimension::Id(1);

    #[inline]
    pub const fn from_id(id: i32) -> Self {
        if id == 0 { Self::Default } else { Self::Id(id) }
    }

    /// Parses a directory-style name: `""` and `DIM0` are the default
    /// dimension, `DIM<n>` is numeric, anything else is kept as a name.
    pub fn parse(name: &str) -> Self {
        if name.is_empty() {
            return Self::Default;
        }
        match name.strip_prefix("DIM").and_then(|id| id.parse().ok()) {
            Some(id) => Self::from_id(id),
            None => Self::Named(name.to_owned()),
        }
    }

    /// Folds equivalent spellings into one key.
    pub fn canonical(self) -> Self {
        match self {
            Self::Id(id) => Self::from_id(id),
            Self::Named(name) => Self::parse(&name),
            Self::Default => Self::Default,
        }
    }

    /// Name of the directory below the world root, `None` for the default.
    pub fn dir_name(&self) -> Option<String> {
        match self {
            Self::Default | Self::Id(0) => None,
            Self::Id(id) => Some(format!("DIM{id}")),
            Self::Named(name) if name.is_empty() => None,
            Self::Named(name) => Some(name.clone()),
        }
    }

    /// Whether the dimension maps to one directory directly below the world
    /// root. Named dimensions may not contain separators or be `.`/`..`.
    pub fn is_valid(&self) -> bool {
        match self.dir_name() {
            Some(name) => is_plain_name(&name),
            None => true,
        }
    }

    pub fn directory(&self, root: &Path) -> PathBuf {
        match self.dir_name() {
            Some(name) => root.join(name),
            None => root.to_path_buf(),
        }
    }
}

impl From<i32> for Dimension {
    fn from(id: i32) -> Self {
        Self::from_id(id)
    }
}

impl From<&str> for Dimension {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for Dimension {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name().unwrap_or_default())
    }
}
