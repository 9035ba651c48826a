//! Walks a tag tree against a [`SchemaNode`], reporting every mismatch and
//! materializing missing fields marked [`SchemaOptions::CREATE_ON_MISSING`].
//!
//! Verification never stops at the first problem: sibling fields and list
//! elements are checked independently, so a single pass yields every
//! diagnostic in the tree.
//!
//! ```
//! use na_world::{Compound, CompoundSchema, SchemaNode, TagNode, verify};
//!
//! let schema = SchemaNode::compound(
//!     "",
//!     CompoundSchema::new()
//!         .with(SchemaNode::int("x"))
//!         .with(SchemaNode::byte("flag").create_on_missing()),
//! );
//! let mut tree = TagNode::Compound(Compound::from_iter([("x", 5i32)]));
//!
//! assert!(verify(&mut tree, &schema).is_success());
//! assert_eq!(tree.as_compound().unwrap().get_byte("flag"), Some(0));
//! ```
//!
//! [`SchemaOptions::CREATE_ON_MISSING`]: crate::SchemaOptions::CREATE_ON_MISSING

use crate::{
    CompoundSchema, List, NbtError, NbtErrorKind, NbtErrors, ScalarKind, SchemaKind, SchemaNode,
    TagID, TagNode,
};

/// Longest string excerpt quoted in a diagnostic.
const EXCERPT_LEN: usize = 40;

/// A tree after verification together with everything found on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Repaired {
    pub tree: TagNode,
    pub report: NbtErrors,
}

/// Verifies `root` against `schema`, repairing it in place.
pub fn verify(root: &mut TagNode, schema: &SchemaNode) -> NbtErrors {
    let mut verifier = Verifier::default();
    verifier.verify(Some(root), schema);
    verifier.finish()
}

/// Owned form of [`verify`]. A missing root is reported as
/// [`NbtErrorKind::MissingTag`] and comes back as [`TagNode::End`].
pub fn repair(root: Option<TagNode>, schema: &SchemaNode) -> Repaired {
    let mut verifier = Verifier::default();
    match root {
        Some(mut tree) => {
            verifier.verify(Some(&mut tree), schema);
            Repaired {
                tree,
                report: verifier.finish(),
            }
        }
        None => {
            verifier.verify(None, schema);
            Repaired {
                tree: TagNode::End,
                report: verifier.finish(),
            }
        }
    }
}

#[derive(Default)]
struct Verifier {
    path: Vec<String>,
    errors: Vec<NbtError>,
    warnings: Vec<NbtError>,
}

impl Verifier {
    fn finish(self) -> NbtErrors {
        NbtErrors::new(self.errors, self.warnings)
    }

    fn error(&mut self, kind: NbtErrorKind, message: String) {
        self.errors.push(NbtError::new(kind, &self.path, message));
    }

    fn warning(&mut self, kind: NbtErrorKind, message: String) {
        self.warnings.push(NbtError::new(kind, &self.path, message));
    }

    fn descend(&mut self, segment: String, tag: Option<&mut TagNode>, schema: &SchemaNode) {
        self.path.push(segment);
        self.verify(tag, schema);
        self.path.pop();
    }

    fn verify(&mut self, tag: Option<&mut TagNode>, schema: &SchemaNode) {
        let Some(tag) = tag else {
            self.error(NbtErrorKind::MissingTag, "Required tag is missing.".to_owned());
            return;
        };

        match &schema.kind {
            SchemaKind::Scalar(kind) => self.scalar(tag, *kind),
            SchemaKind::String { max_len, value } => self.string(tag, *max_len, value.as_deref()),
            SchemaKind::ByteArray { len } => self.array(tag, TagID::ByteArray, *len),
            SchemaKind::IntArray { len } => self.array(tag, TagID::IntArray, *len),
            SchemaKind::LongArray { len } => self.array(tag, TagID::LongArray, *len),
            SchemaKind::ShortArray { len } => self.array(tag, TagID::ShortArray, *len),
            SchemaKind::List {
                item_type,
                item_schema,
                len,
            } => self.list(tag, *item_type, item_schema.as_deref(), *len),
            SchemaKind::Compound(children) => self.compound(tag, children),
            SchemaKind::Either(choices) => self.either(tag, choices),
        }
    }

    fn scalar(&mut self, tag: &TagNode, kind: ScalarKind) {
        if !tag.is_castable_to(kind.tag_id()) {
            self.error(
                NbtErrorKind::InvalidTagType,
                format!("Expected a {} value; got {}.", kind.tag_id(), describe(tag)),
            );
        }
    }

    fn string(&mut self, tag: &TagNode, max_len: Option<usize>, exact: Option<&str>) {
        let TagNode::String(value) = tag else {
            self.error(
                NbtErrorKind::InvalidTagType,
                format!("Expected a string value; got {}.", describe(tag)),
            );
            return;
        };

        let chars = value.chars().count();
        if let Some(max_len) = max_len.filter(|&max_len| chars > max_len) {
            self.error(
                NbtErrorKind::InvalidTagValue,
                format!("String is too long ({chars} chars > limit of {max_len})."),
            );
        }
        if let Some(exact) = exact.filter(|&exact| value != exact) {
            self.error(
                NbtErrorKind::InvalidTagValue,
                format!("String is supposed to be \"{exact}\", but was actually \"{value}\"."),
            );
        }
    }

    fn array(&mut self, tag: &TagNode, expected: TagID, len: Option<usize>) {
        let actual = match (expected, tag) {
            (TagID::ByteArray, TagNode::ByteArray(values)) => values.len(),
            (TagID::IntArray, TagNode::IntArray(values)) => values.len(),
            (TagID::LongArray, TagNode::LongArray(values)) => values.len(),
            (TagID::ShortArray, TagNode::ShortArray(values)) => values.len(),
            _ => {
                self.error(
                    NbtErrorKind::InvalidTagType,
                    format!("Expected a {expected}; got {}.", describe(tag)),
                );
                return;
            }
        };

        if let Some(len) = len.filter(|&len| actual != len) {
            let unit = if expected == TagID::ByteArray { "bytes" } else { "values" };
            self.error(
                NbtErrorKind::InvalidTagValue,
                format!(
                    "{} is the wrong size ({actual} {unit} != expected {len}).",
                    capitalize(expected.name())
                ),
            );
        }
    }

    fn list(
        &mut self,
        tag: &mut TagNode,
        item_type: TagID,
        item_schema: Option<&SchemaNode>,
        len: Option<usize>,
    ) {
        let TagNode::List(list) = tag else {
            self.error(
                NbtErrorKind::InvalidTagType,
                format!("Expected a list; got {}.", describe(tag)),
            );
            return;
        };

        if !list.is_empty() && list.element_tag_id() != item_type {
            self.error(
                NbtErrorKind::InvalidTagValue,
                format!(
                    "List items are the wrong type ({} != expected {item_type}).",
                    list.element_tag_id()
                ),
            );
            return;
        }
        if let Some(len) = len.filter(|&len| list.len() != len) {
            self.error(
                NbtErrorKind::InvalidTagValue,
                format!("List is the wrong size ({} items != expected {len}).", list.len()),
            );
            return;
        }
        if let Some(item_schema) = item_schema {
            self.list_items(list, item_schema);
        }
    }

    fn list_items(&mut self, list: &mut List, item_schema: &SchemaNode) {
        for (index, item) in list.iter_mut().enumerate() {
            self.descend(index.to_string(), Some(item), item_schema);
        }
    }

    fn compound(&mut self, tag: &mut TagNode, schema: &CompoundSchema) {
        let TagNode::Compound(compound) = tag else {
            self.error(
                NbtErrorKind::InvalidTagType,
                format!("Expected a compound; got {}.", describe(tag)),
            );
            return;
        };

        // defaults are held back until the scan is over
        let mut created = Vec::new();
        for child in schema {
            match compound.get_ignore_case_mut(&child.name) {
                None if child.is_create_on_missing() => {
                    created.push((child.name.clone(), child.build_default_tree()));
                }
                None if child.is_optional() => {}
                entry => self.descend(child.name.clone(), entry, child),
            }
        }

        for key in compound.keys() {
            if !schema.contains(key) {
                self.path.push(key.to_owned());
                self.warning(
                    NbtErrorKind::UnexpectedTag,
                    format!("Compound contains an unknown tag \"{key}\"."),
                );
                self.path.pop();
            }
        }

        for (name, value) in created {
            compound.insert(name, value);
        }
    }

    fn either(&mut self, tag: &mut TagNode, choices: &[SchemaNode]) {
        for choice in choices {
            let mut candidate = tag.clone();
            let mut trial = Verifier {
                path: self.path.clone(),
                ..Verifier::default()
            };
            trial.verify(Some(&mut candidate), choice);
            if trial.errors.is_empty() {
                *tag = candidate;
                self.warnings.extend(trial.warnings);
                return;
            }
        }

        self.error(
            NbtErrorKind::InvalidTagType,
            format!(
                "Value matched none of {} alternatives; got {}.",
                choices.len(),
                describe(tag)
            ),
        );
    }
}

/// Renders a tag for a diagnostic: its type plus an abbreviated value or size.
pub fn describe(tag: &TagNode) -> String {
    match tag {
        TagNode::End => "end".to_owned(),
        TagNode::Byte(value) => format!("byte ({value})"),
        TagNode::Short(value) => format!("short ({value})"),
        TagNode::Int(value) => format!("int ({value})"),
        TagNode::Long(value) => format!("long ({value})"),
        TagNode::Float(value) => format!("float ({value})"),
        TagNode::Double(value) => format!("double ({value})"),
        TagNode::String(value) => {
            if value.chars().count() > EXCERPT_LEN {
                let excerpt: String = value.chars().take(EXCERPT_LEN).collect();
                format!("string (\"{excerpt}...\")")
            } else {
                format!("string (\"{value}\")")
            }
        }
        TagNode::ByteArray(values) => format!("byte array (size {})", values.len()),
        TagNode::IntArray(values) => format!("int array (size {})", values.len()),
        TagNode::LongArray(values) => format!("long array (size {})", values.len()),
        TagNode::ShortArray(values) => format!("short array (size {})", values.len()),
        TagNode::List(list) => format!("list ({} children)", list.len()),
        TagNode::Compound(compound) => format!("compound ({} children)", compound.len()),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
