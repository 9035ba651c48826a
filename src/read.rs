use std::io::Read;

use zerocopy::byteorder;

use crate::{ByteOrder, Compound, Error, List, NamedTag, Result, TagID, TagNode, cold_path};

/// Deepest compound/list nesting the reader accepts before giving up.
pub const MAX_DEPTH: usize = 512;

struct Reader<'s> {
    data: &'s [u8],
    pos: usize,
}

macro_rules! check_bounds {
    ($reader:expr, $extra:expr) => {
        if $reader.data.len() - $reader.pos < $extra {
            cold_path();
            return Err(Error::EndOfFile);
        }
    };
}

macro_rules! read_num {
    ($reader:expr, $ty:ident, $n:literal) => {{
        check_bounds!($reader, $n);
        let mut raw = [0u8; $n];
        raw.copy_from_slice(&$reader.data[$reader.pos..$reader.pos + $n]);
        $reader.pos += $n;
        byteorder::$ty::<O>::from_bytes(raw).get()
    }};
}

impl<'s> Reader<'s> {
    #[inline]
    fn take(&mut self, len: usize) -> Result<&'s [u8]> {
        check_bounds!(self, len);
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    #[inline]
    fn tag_id(&mut self) -> Result<TagID> {
        check_bounds!(self, 1);
        let raw = self.data[self.pos];
        self.pos += 1;
        TagID::from_u8(raw).ok_or(Error::InvalidTagType(raw))
    }

    fn string<O: ByteOrder>(&mut self) -> Result<String> {
        let len = read_num!(self, U16, 2) as usize;
        let raw = self.take(len)?;
        Ok(simd_cesu8::mutf8::decode_lossy(raw).into_owned())
    }

    /// Reads an i32 length prefix and checks that `len * size` bytes remain.
    fn array_len<O: ByteOrder>(&mut self, element_size: usize) -> Result<usize> {
        let len = read_num!(self, I32, 4);
        if len < 0 {
            cold_path();
            return Err(Error::NegativeLength(len));
        }
        let len = len as usize;
        match len.checked_mul(element_size) {
            Some(bytes) => {
                check_bounds!(self, bytes);
                Ok(len)
            }
            None => Err(Error::EndOfFile),
        }
    }

    fn leaf<O: ByteOrder>(&mut self, tag_id: TagID) -> Result<TagNode> {
        Ok(match tag_id {
            TagID::End => TagNode::End,
            TagID::Byte => TagNode::Byte(self.take(1)?[0] as i8),
            TagID::Short => TagNode::Short(read_num!(self, I16, 2)),
            TagID::Int => TagNode::Int(read_num!(self, I32, 4)),
            TagID::Long => TagNode::Long(read_num!(self, I64, 8)),
            TagID::Float => TagNode::Float(read_num!(self, F32, 4)),
            TagID::Double => TagNode::Double(read_num!(self, F64, 8)),
            TagID::ByteArray => {
                let len = self.array_len::<O>(tag_id.element_size())?;
                TagNode::ByteArray(self.take(len)?.iter().map(|&b| b as i8).collect())
            }
            TagID::ShortArray => {
                let len = self.array_len::<O>(tag_id.element_size())?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(read_num!(self, I16, 2));
                }
                TagNode::ShortArray(values)
            }
            TagID::IntArray => {
                let len = self.array_len::<O>(tag_id.element_size())?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(read_num!(self, I32, 4));
                }
                TagNode::IntArray(values)
            }
            TagID::LongArray => {
                let len = self.array_len::<O>(tag_id.element_size())?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(read_num!(self, I64, 8));
                }
                TagNode::LongArray(values)
            }
            TagID::String => TagNode::String(self.string::<O>()?),
            TagID::List | TagID::Compound => unreachable!("containers are opened as frames"),
        })
    }

    #[inline(never)]
    fn open_list<O: ByteOrder>(&mut self) -> Result<Frame> {
        let element = self.tag_id()?;
        let len = read_num!(self, I32, 4);
        if len < 0 {
            cold_path();
            return Err(Error::NegativeLength(len));
        }
        if element == TagID::End && len > 0 {
            cold_path();
            return Err(Error::InvalidTagType(TagID::End as u8));
        }
        let len = len as usize;
        // every element occupies at least one byte, which caps hostile lengths
        let remaining = self.data.len() - self.pos;
        Ok(Frame::List {
            element,
            remaining: len,
            items: Vec::with_capacity(len.min(remaining)),
        })
    }

    /// Tag id of the next child of `frame`, or `None` once it is complete.
    #[inline]
    fn next_child<O: ByteOrder>(&mut self, frame: &mut Frame) -> Result<Option<TagID>> {
        match frame {
            Frame::List {
                element, remaining, ..
            } => {
                if *remaining == 0 {
                    return Ok(None);
                }
                *remaining -= 1;
                Ok(Some(*element))
            }
            Frame::Compound { key, .. } => {
                let tag_id = self.tag_id()?;
                if tag_id == TagID::End {
                    return Ok(None);
                }
                *key = self.string::<O>()?;
                Ok(Some(tag_id))
            }
        }
    }

    /// Reads one value. Nested containers are tracked on an explicit stack,
    /// so hostile nesting costs heap instead of call stack.
    fn value<O: ByteOrder>(&mut self, root: TagID) -> Result<TagNode> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut tag_id = root;
        loop {
            let mut node = match tag_id {
                TagID::List | TagID::Compound => {
                    if stack.len() == MAX_DEPTH {
                        cold_path();
                        return Err(Error::NestingTooDeep(MAX_DEPTH));
                    }
                    let frame = if tag_id == TagID::List {
                        self.open_list::<O>()?
                    } else {
                        Frame::Compound {
                            compound: Compound::new(),
                            key: String::new(),
                        }
                    };
                    stack.push(frame);
                    None
                }
                _ => Some(self.leaf::<O>(tag_id)?),
            };

            loop {
                let Some(frame) = stack.last_mut() else {
                    match node {
                        Some(node) => return Ok(node),
                        None => unreachable!("an open frame is always on the stack"),
                    }
                };
                if let Some(value) = node.take() {
                    frame.accept(value);
                }
                match self.next_child::<O>(frame)? {
                    Some(next) => {
                        tag_id = next;
                        break;
                    }
                    None => node = stack.pop().map(Frame::finish),
                }
            }
        }
    }
}

/// A container whose children are still being read.
enum Frame {
    List {
        element: TagID,
        remaining: usize,
        items: Vec<TagNode>,
    },
    Compound {
        compound: Compound,
        key: String,
    },
}

impl Frame {
    #[inline]
    fn accept(&mut self, value: TagNode) {
        match self {
            Frame::List { items, .. } => items.push(value),
            // duplicate keys: the last occurrence wins, at the first one's position
            Frame::Compound { compound, key } => {
                compound.insert(std::mem::take(key), value);
            }
        }
    }

    fn finish(self) -> TagNode {
        match self {
            Frame::List { element, items, .. } => TagNode::List(List::from_raw(element, items)),
            Frame::Compound { compound, .. } => TagNode::Compound(compound),
        }
    }
}

/// Decodes a complete NBT document from a byte slice.
///
/// The whole slice must be consumed; leftover bytes are reported as
/// [`Error::TrailingData`].
///
/// ```
/// use na_world::{read, BigEndian, TagNode};
///
/// let data = [0x03, 0x00, 0x01, b'x', 0x00, 0x00, 0x00, 0x2a];
/// let root = read::<BigEndian>(&data).unwrap();
/// assert_eq!(root.name, "x");
/// assert_eq!(root.value, TagNode::Int(42));
/// ```
pub fn read<O: ByteOrder>(source: &[u8]) -> Result<NamedTag> {
    let mut reader = Reader {
        data: source,
        pos: 0,
    };

    let tag_id = reader.tag_id()?;
    let root = if tag_id == TagID::End {
        cold_path();
        NamedTag::default()
    } else {
        let name = reader.string::<O>()?;
        let value = reader.value::<O>(tag_id)?;
        NamedTag { name, value }
    };

    if reader.pos != source.len() {
        cold_path();
        return Err(Error::TrailingData(source.len() - reader.pos));
    }
    Ok(root)
}

/// Reads every byte from `reader` and decodes it with [`read`].
pub fn read_from_reader<O: ByteOrder>(mut reader: impl Read) -> Result<NamedTag> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(Error::IO)?;
    read::<O>(&buf)
}
