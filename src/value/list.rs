use crate::{Error, Result, TagID, TagNode, cold_path};

/// A homogeneous sequence of tags.
///
/// The element type of an empty list is [`TagID::End`] until the first
/// element is pushed, after which every element must share that type.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    element: TagID,
    items: Vec<TagNode>,
}

impl Default for List {
    #[inline]
    fn default() -> Self {
        Self {
            element: TagID::End,
            items: Vec::new(),
        }
    }
}

impl List {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list whose element type is already fixed.
    #[inline]
    pub fn of(element: TagID) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    /// Builds a list from `items`, failing if they do not share one type.
    pub fn from_vec(items: Vec<TagNode>) -> Result<Self> {
        let mut list = Self::with_capacity(items.len());
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            element: TagID::End,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Element type recorded for this list.
    #[inline]
    pub fn element_tag_id(&self) -> TagID {
        self.element
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `value`.
    ///
    /// An untyped (`End`) empty list adopts the type of its first element.
    pub fn push(&mut self, value: impl Into<TagNode>) -> Result<()> {
        let value = value.into();
        let tag_id = value.tag_id();
        if self.items.is_empty() && (self.element == TagID::End || self.element == tag_id) {
            self.element = tag_id;
        } else if self.element != tag_id {
            cold_path();
            return Err(Error::TagMismatch(self.element, tag_id));
        }
        self.items.push(value);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<TagNode> {
        self.items.pop()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TagNode> {
        self.items.get(index)
    }

    /// Mutable access to an element.
    ///
    /// Callers must not change the element's tag type.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TagNode> {
        self.items.get_mut(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, TagNode> {
        self.items.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TagNode> {
        self.items.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[TagNode] {
        &self.items
    }

    /// Builds a list without checking element types; the reader has already
    /// decoded every element with `element`.
    #[inline]
    pub(crate) fn from_raw(element: TagID, items: Vec<TagNode>) -> Self {
        Self { element, items }
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a TagNode;
    type IntoIter = std::slice::Iter<'a, TagNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for List {
    type Item = TagNode;
    type IntoIter = std::vec::IntoIter<TagNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
