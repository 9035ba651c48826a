use std::fmt::{self, Display};

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TagID {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
    /// Non-standard extension id, written by older world editors.
    ShortArray = 100,
}

impl TagID {
    /// Parses a raw tag id, returning `None` for ids outside the known set.
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            100 => Self::ShortArray,
            _ => return None,
        })
    }

    /// Returns `true` if this is a primitive tag type.
    ///
    /// Primitive tags are: End, Byte, Short, Int, Long, Float, Double.
    /// These tags store their values directly without additional structure.
    ///
    /// # Example
    ///
    /// ```
    /// use na_world::TagID;
    ///
    /// assert!(TagID::Int.is_primitive());
    /// assert!(TagID::Double.is_primitive());
    /// assert!(!TagID::List.is_primitive());
    /// assert!(!TagID::ByteArray.is_primitive());
    /// ```
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::End
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }

    /// Returns `true` if this is an array tag type.
    ///
    /// Array tags are: ByteArray, ShortArray, IntArray, LongArray.
    ///
    /// # Example
    ///
    /// ```
    /// use na_world::TagID;
    ///
    /// assert!(TagID::ByteArray.is_array());
    /// assert!(TagID::ShortArray.is_array());
    /// assert!(!TagID::List.is_array());
    /// ```
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::ByteArray | Self::ShortArray | Self::IntArray | Self::LongArray
        )
    }

    /// Returns `true` if this is a composite tag type (List or Compound).
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::List | Self::Compound)
    }

    /// Size in bytes of a fixed-width payload, or of one element for arrays.
    pub(crate) const fn element_size(self) -> usize {
        match self {
            Self::End | Self::String | Self::List | Self::Compound => 0,
            Self::Byte | Self::ByteArray => 1,
            Self::Short | Self::ShortArray => 2,
            Self::Int | Self::Float | Self::IntArray => 4,
            Self::Long | Self::Double | Self::LongArray => 8,
        }
    }

    /// Lower-case name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::ByteArray => "byte array",
            Self::String => "string",
            Self::List => "list",
            Self::Compound => "compound",
            Self::IntArray => "int array",
            Self::LongArray => "long array",
            Self::ShortArray => "short array",
        }
    }
}

impl Display for TagID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
