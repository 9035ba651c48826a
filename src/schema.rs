//! Declarative descriptions of what a tag tree must look like.
//!
//! A [`SchemaNode`] mirrors the shape of a [`TagNode`]: scalars, strings,
//! arrays, lists and compounds, plus [`SchemaKind::Either`] for positions that
//! accept one of several shapes. Compound schemas are composed with
//! [`CompoundSchema::merge_into`] instead of inheritance:
//!
//! ```
//! use na_world::{CompoundSchema, SchemaNode};
//!
//! let entity = CompoundSchema::new()
//!     .with(SchemaNode::string("id"))
//!     .with(SchemaNode::short("Health"));
//! let spider = entity.merge_into(&CompoundSchema::new().with(SchemaNode::string_value("id", "Spider")));
//!
//! assert_eq!(spider.len(), 2);
//! assert_eq!(spider.children()[0], SchemaNode::string_value("id", "Spider"));
//! ```

use bitflags::bitflags;

use crate::{Compound, List, TagID, TagNode, util::eq_ignore_case};

bitflags! {
    /// Per-field verification options.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SchemaOptions: u8 {
        /// The field may be absent.
        const OPTIONAL = 1 << 0;
        /// An absent field is synthesized from its default tree.
        const CREATE_ON_MISSING = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl ScalarKind {
    pub const fn tag_id(self) -> TagID {
        match self {
            ScalarKind::Byte => TagID::Byte,
            ScalarKind::Short => TagID::Short,
            ScalarKind::Int => TagID::Int,
            ScalarKind::Long => TagID::Long,
            ScalarKind::Float => TagID::Float,
            ScalarKind::Double => TagID::Double,
        }
    }

    pub const fn zero(self) -> TagNode {
        match self {
            ScalarKind::Byte => TagNode::Byte(0),
            ScalarKind::Short => TagNode::Short(0),
            ScalarKind::Int => TagNode::Int(0),
            ScalarKind::Long => TagNode::Long(0),
            ScalarKind::Float => TagNode::Float(0.0),
            ScalarKind::Double => TagNode::Double(0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaKind {
    Scalar(ScalarKind),
    String {
        max_len: Option<usize>,
        value: Option<String>,
    },
    ByteArray {
        len: Option<usize>,
    },
    IntArray {
        len: Option<usize>,
    },
    LongArray {
        len: Option<usize>,
    },
    ShortArray {
        len: Option<usize>,
    },
    List {
        item_type: TagID,
        item_schema: Option<Box<SchemaNode>>,
        len: Option<usize>,
    },
    Compound(CompoundSchema),
    Either(Vec<SchemaNode>),
}

/// A schema node bound to the key it describes inside its parent compound.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaNode {
    pub name: String,
    pub options: SchemaOptions,
    pub kind: SchemaKind,
}

macro_rules! scalar_ctor {
    ($($fn:ident => $kind:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $fn(name: impl Into<String>) -> Self {
                Self::new(name, SchemaKind::Scalar(ScalarKind::$kind))
            }
        )*
    };
}

macro_rules! array_ctor {
    ($($fn:ident => $kind:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $fn(name: impl Into<String>) -> Self {
                Self::new(name, SchemaKind::$kind { len: None })
            }
        )*
    };
}

impl SchemaNode {
    #[inline]
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            options: SchemaOptions::empty(),
            kind,
        }
    }

    scalar_ctor! {
        byte => Byte,
        short => Short,
        int => Int,
        long => Long,
        float => Float,
        double => Double,
    }

    array_ctor! {
        byte_array => ByteArray,
        int_array => IntArray,
        long_array => LongArray,
        short_array => ShortArray,
    }

    #[inline]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(
            name,
            SchemaKind::String {
                max_len: None,
                value: None,
            },
        )
    }

    /// A string pinned to exactly `value`.
    #[inline]
    pub fn string_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            SchemaKind::String {
                max_len: None,
                value: Some(value.into()),
            },
        )
    }

    #[inline]
    pub fn list(name: impl Into<String>, item_type: TagID) -> Self {
        Self::new(
            name,
            SchemaKind::List {
                item_type,
                item_schema: None,
                len: None,
            },
        )
    }

    #[inline]
    pub fn compound(name: impl Into<String>, schema: CompoundSchema) -> Self {
        Self::new(name, SchemaKind::Compound(schema))
    }

    #[inline]
    pub fn either(name: impl Into<String>, choices: Vec<SchemaNode>) -> Self {
        Self::new(name, SchemaKind::Either(choices))
    }

    /// Requires an exact length for arrays and lists, or a maximum length
    /// for strings. Has no effect on other kinds.
    pub fn with_length(mut self, length: usize) -> Self {
        match &mut self.kind {
            SchemaKind::String { max_len, .. } => *max_len = Some(length),
            SchemaKind::ByteArray { len }
            | SchemaKind::IntArray { len }
            | SchemaKind::LongArray { len }
            | SchemaKind::ShortArray { len }
            | SchemaKind::List { len, .. } => *len = Some(length),
            SchemaKind::Scalar(_) | SchemaKind::Compound(_) | SchemaKind::Either(_) => {}
        }
        self
    }

    /// Schema every element of a list must satisfy. Has no effect on other kinds.
    pub fn with_item_schema(mut self, schema: SchemaNode) -> Self {
        if let SchemaKind::List { item_schema, .. } = &mut self.kind {
            *item_schema = Some(Box::new(schema));
        }
        self
    }

    #[inline]
    pub fn with_options(mut self, options: SchemaOptions) -> Self {
        self.options |= options;
        self
    }

    #[inline]
    pub fn optional(self) -> Self {
        self.with_options(SchemaOptions::OPTIONAL)
    }

    #[inline]
    pub fn create_on_missing(self) -> Self {
        self.with_options(SchemaOptions::CREATE_ON_MISSING)
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.options.contains(SchemaOptions::OPTIONAL)
    }

    #[inline]
    pub fn is_create_on_missing(&self) -> bool {
        self.options.contains(SchemaOptions::CREATE_ON_MISSING)
    }

    /// Builds the smallest tree this node accepts.
    ///
    /// Scalars are zero, strings are their pinned value or empty, arrays are
    /// zero-filled to their declared length, lists are empty, compounds hold
    /// the defaults of every required or creatable child, and an `Either`
    /// takes the default of its first choice.
    pub fn build_default_tree(&self) -> TagNode {
        match &self.kind {
            SchemaKind::Scalar(kind) => kind.zero(),
            SchemaKind::String { value, .. } => {
                TagNode::String(value.clone().unwrap_or_default())
            }
            SchemaKind::ByteArray { len } => TagNode::ByteArray(vec![0; len.unwrap_or(0)]),
            SchemaKind::IntArray { len } => TagNode::IntArray(vec![0; len.unwrap_or(0)]),
            SchemaKind::LongArray { len } => TagNode::LongArray(vec![0; len.unwrap_or(0)]),
            SchemaKind::ShortArray { len } => TagNode::ShortArray(vec![0; len.unwrap_or(0)]),
            SchemaKind::List { item_type, .. } => TagNode::List(List::of(*item_type)),
            SchemaKind::Compound(schema) => TagNode::Compound(schema.build_default_compound()),
            SchemaKind::Either(choices) => choices
                .first()
                .map(SchemaNode::build_default_tree)
                .unwrap_or_default(),
        }
    }
}

/// Ordered child schemas of a compound. Names are unique, compared
/// ASCII case-insensitively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundSchema {
    children: Vec<SchemaNode>,
}

impl CompoundSchema {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `child`, replacing an existing child of the same name in place.
    pub fn with(mut self, child: SchemaNode) -> Self {
        self.insert(child);
        self
    }

    pub fn insert(&mut self, child: SchemaNode) {
        match self.position(&child.name) {
            Some(index) => self.children[index] = child,
            None => self.children.push(child),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| eq_ignore_case(&child.name, name))
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.position(name).map(|index| &self.children[index])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[inline]
    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaNode> {
        self.children.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns a new schema made of this schema's fields extended by
    /// `additional`.
    ///
    /// Fields keep this schema's order. A field of `additional` whose name
    /// collides with an existing one replaces it at the same position; the
    /// rest are appended in `additional`'s order. Neither input is modified.
    pub fn merge_into(&self, additional: &CompoundSchema) -> CompoundSchema {
        let mut merged = self.clone();
        for child in additional {
            merged.insert(child.clone());
        }
        merged
    }

    pub(crate) fn build_default_compound(&self) -> Compound {
        self.children
            .iter()
            .filter(|child| !child.is_optional() || child.is_create_on_missing())
            .map(|child| (child.name.clone(), child.build_default_tree()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a CompoundSchema {
    type Item = &'a SchemaNode;
    type IntoIter = std::slice::Iter<'a, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl FromIterator<SchemaNode> for CompoundSchema {
    fn from_iter<T: IntoIterator<Item = SchemaNode>>(iter: T) -> Self {
        let mut schema = CompoundSchema::new();
        for child in iter {
            schema.insert(child);
        }
        schema
    }
}
