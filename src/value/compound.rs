use indexmap::IndexMap;

use crate::{TagNode, util::eq_ignore_case};

/// A keyed collection of child tags.
///
/// Keys are unique. Iteration follows insertion order so that a decoded
/// compound is written back in the order it was read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compound {
    entries: IndexMap<String, TagNode>,
}

impl Compound {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&TagNode> {
        self.entries.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut TagNode> {
        self.entries.get_mut(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks `key` up exactly, then falls back to an ASCII case-insensitive match.
    pub fn get_ignore_case(&self, key: &str) -> Option<&TagNode> {
        self.position_ignore_case(key)
            .and_then(|index| self.entries.get_index(index))
            .map(|(_, value)| value)
    }

    /// Mutable counterpart of [`Compound::get_ignore_case`].
    pub fn get_ignore_case_mut(&mut self, key: &str) -> Option<&mut TagNode> {
        let index = self.position_ignore_case(key)?;
        self.entries.get_index_mut(index).map(|(_, value)| value)
    }

    fn position_ignore_case(&self, key: &str) -> Option<usize> {
        self.entries
            .get_index_of(key)
            .or_else(|| self.entries.keys().position(|k| eq_ignore_case(k, key)))
    }

    /// Inserts a value, returning the previous value stored under `key`.
    ///
    /// Replacing an existing key keeps that key's position.
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagNode>) -> Option<TagNode> {
        self.entries.insert(key.into(), value.into())
    }

    /// Inserts a value under a key matched like [`Compound::get_ignore_case`].
    /// An existing key keeps its spelling and position.
    pub fn insert_ignore_case(
        &mut self,
        key: impl Into<String>,
        value: impl Into<TagNode>,
    ) -> Option<TagNode> {
        let key = key.into();
        match self.position_ignore_case(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index], value.into())),
            None => self.entries.insert(key, value.into()),
        }
    }

    /// Removes `key`, preserving the order of the remaining entries.
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<TagNode> {
        self.entries.shift_remove(key)
    }

    /// Removes the entry [`Compound::get_ignore_case`] would return.
    pub fn remove_ignore_case(&mut self, key: &str) -> Option<TagNode> {
        let index = self.position_ignore_case(key)?;
        self.entries.shift_remove_index(index).map(|(_, value)| value)
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[inline]
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TagNode> {
        self.entries.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, TagNode> {
        self.entries.iter_mut()
    }

    #[inline]
    pub fn get_byte(&self, key: &str) -> Option<i8> {
        self.get(key).and_then(TagNode::as_byte)
    }

    #[inline]
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(TagNode::as_int)
    }

    #[inline]
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(TagNode::as_long)
    }

    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TagNode::as_str)
    }

    #[inline]
    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        self.get(key).and_then(TagNode::as_compound)
    }

    #[inline]
    pub fn get_compound_mut(&mut self, key: &str) -> Option<&mut Compound> {
        self.get_mut(key).and_then(TagNode::as_compound_mut)
    }

    /// The compound stored at `key` (matched ignoring ASCII case), inserted
    /// (or replacing a non-compound value) when needed.
    pub fn compound_entry(&mut self, key: impl Into<String>) -> &mut Compound {
        let key = key.into();
        let index = match self.position_ignore_case(&key) {
            Some(index) => index,
            None => self.entries.insert_full(key, TagNode::Compound(Compound::new())).0,
        };
        self.entries[index].make_compound()
    }
}

impl<'a> IntoIterator for &'a Compound {
    type Item = (&'a String, &'a TagNode);
    type IntoIter = indexmap::map::Iter<'a, String, TagNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Compound {
    type Item = (String, TagNode);
    type IntoIter = indexmap::map::IntoIter<String, TagNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<TagNode>> FromIterator<(K, V)> for Compound {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
