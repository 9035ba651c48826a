use crate::{Compound, List, TagID};

/// An owned NBT value.
///
/// Every node exclusively owns its children, so a tree can never contain a
/// cycle or a shared subtree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TagNode {
    #[default]
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    ShortArray(Vec<i16>),
}

/// A root tag together with the name it was stored under.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedTag {
    pub name: String,
    pub value: TagNode,
}

impl NamedTag {
    #[inline]
    pub fn new(name: impl Into<String>, value: impl Into<TagNode>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

macro_rules! scalar_accessors {
    ($($variant:ident => $as:ident, $ty:ty);* $(;)?) => {
        $(
            #[inline]
            pub fn $as(&self) -> Option<$ty> {
                match self {
                    Self::$variant(value) => Some(*value),
                    _ => None,
                }
            }
        )*
    };
}

macro_rules! ref_accessors {
    ($($variant:ident => $as:ident, $as_mut:ident, $ty:ty);* $(;)?) => {
        $(
            #[inline]
            pub fn $as(&self) -> Option<&$ty> {
                match self {
                    Self::$variant(value) => Some(value),
                    _ => None,
                }
            }

            #[inline]
            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Self::$variant(value) => Some(value),
                    _ => None,
                }
            }
        )*
    };
}

impl TagNode {
    pub const fn tag_id(&self) -> TagID {
        match self {
            Self::End => TagID::End,
            Self::Byte(_) => TagID::Byte,
            Self::Short(_) => TagID::Short,
            Self::Int(_) => TagID::Int,
            Self::Long(_) => TagID::Long,
            Self::Float(_) => TagID::Float,
            Self::Double(_) => TagID::Double,
            Self::ByteArray(_) => TagID::ByteArray,
            Self::String(_) => TagID::String,
            Self::List(_) => TagID::List,
            Self::Compound(_) => TagID::Compound,
            Self::IntArray(_) => TagID::IntArray,
            Self::LongArray(_) => TagID::LongArray,
            Self::ShortArray(_) => TagID::ShortArray,
        }
    }

    /// Returns `true` if this value can be read as `target` without loss.
    ///
    /// Every tag is castable to its own type. Integers widen to any larger
    /// integer type and `Float` widens to `Double`.
    ///
    /// ```
    /// use na_world::{TagID, TagNode};
    ///
    /// assert!(TagNode::Byte(1).is_castable_to(TagID::Int));
    /// assert!(!TagNode::Long(1).is_castable_to(TagID::Int));
    /// ```
    pub const fn is_castable_to(&self, target: TagID) -> bool {
        match self {
            Self::Byte(_) => matches!(
                target,
                TagID::Byte | TagID::Short | TagID::Int | TagID::Long
            ),
            Self::Short(_) => matches!(target, TagID::Short | TagID::Int | TagID::Long),
            Self::Int(_) => matches!(target, TagID::Int | TagID::Long),
            Self::Float(_) => matches!(target, TagID::Float | TagID::Double),
            _ => self.tag_id() as u8 == target as u8,
        }
    }

    scalar_accessors! {
        Byte => as_byte, i8;
        Short => as_short, i16;
        Int => as_int, i32;
        Long => as_long, i64;
        Float => as_float, f32;
        Double => as_double, f64;
    }

    ref_accessors! {
        ByteArray => as_byte_array, as_byte_array_mut, Vec<i8>;
        List => as_list, as_list_mut, List;
        Compound => as_compound, as_compound_mut, Compound;
        IntArray => as_int_array, as_int_array_mut, Vec<i32>;
        LongArray => as_long_array, as_long_array_mut, Vec<i64>;
        ShortArray => as_short_array, as_short_array_mut, Vec<i16>;
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Reads any integer tag as `i64`, widening smaller integer types.
    pub fn to_i64(&self) -> Option<i64> {
        match *self {
            Self::Byte(value) => Some(value.into()),
            Self::Short(value) => Some(value.into()),
            Self::Int(value) => Some(value.into()),
            Self::Long(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the compound payload, first replacing any other value with an
    /// empty compound.
    pub fn make_compound(&mut self) -> &mut Compound {
        if !matches!(self, Self::Compound(_)) {
            *self = Self::Compound(Compound::new());
        }
        match self {
            Self::Compound(value) => value,
            _ => unreachable!(),
        }
    }

    #[inline]
    pub fn into_compound(self) -> Option<Compound> {
        match self {
            Self::Compound(value) => Some(value),
            _ => None,
        }
    }
}

impl From<()> for TagNode {
    fn from(_: ()) -> Self {
        TagNode::End
    }
}

impl From<bool> for TagNode {
    fn from(value: bool) -> Self {
        TagNode::Byte(value as i8)
    }
}

impl From<i8> for TagNode {
    fn from(value: i8) -> Self {
        TagNode::Byte(value)
    }
}

impl From<i16> for TagNode {
    fn from(value: i16) -> Self {
        TagNode::Short(value)
    }
}

impl From<i32> for TagNode {
    fn from(value: i32) -> Self {
        TagNode::Int(value)
    }
}

impl From<i64> for TagNode {
    fn from(value: i64) -> Self {
        TagNode::Long(value)
    }
}

impl From<f32> for TagNode {
    fn from(value: f32) -> Self {
        TagNode::Float(value)
    }
}

impl From<f64> for TagNode {
    fn from(value: f64) -> Self {
        TagNode::Double(value)
    }
}

impl From<Vec<i8>> for TagNode {
    fn from(value: Vec<i8>) -> Self {
        TagNode::ByteArray(value)
    }
}

impl From<Vec<i16>> for TagNode {
    fn from(value: Vec<i16>) -> Self {
        TagNode::ShortArray(value)
    }
}

impl From<Vec<i32>> for TagNode {
    fn from(value: Vec<i32>) -> Self {
        TagNode::IntArray(value)
    }
}

impl From<Vec<i64>> for TagNode {
    fn from(value: Vec<i64>) -> Self {
        TagNode::LongArray(value)
    }
}

impl From<&str> for TagNode {
    fn from(value: &str) -> Self {
        TagNode::String(value.to_owned())
    }
}

impl From<String> for TagNode {
    fn from(value: String) -> Self {
        TagNode::String(value)
    }
}

impl From<List> for TagNode {
    fn from(value: List) -> Self {
        TagNode::List(value)
    }
}

impl From<Compound> for TagNode {
    fn from(value: Compound) -> Self {
        TagNode::Compound(value)
    }
}
