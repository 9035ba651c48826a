use std::io::Write;

use zerocopy::byteorder;

use crate::{ByteOrder, Compound, Error, List, NamedTag, Result, TagID, TagNode, cold_path};

#[inline]
fn write_string<O: ByteOrder>(value: &str, out: &mut Vec<u8>) -> Result<()> {
    let data = simd_cesu8::mutf8::encode(value);
    if data.len() > u16::MAX as usize {
        cold_path();
        return Err(Error::StringTooLong(data.len()));
    }
    out.extend_from_slice(&byteorder::U16::<O>::from(data.len() as u16).to_bytes());
    out.extend_from_slice(&data);
    Ok(())
}

#[inline]
fn write_len<O: ByteOrder>(len: usize, out: &mut Vec<u8>) -> Result<()> {
    let Ok(raw) = i32::try_from(len) else {
        cold_path();
        return Err(Error::ListTooLong(len));
    };
    out.extend_from_slice(&byteorder::I32::<O>::new(raw).to_bytes());
    Ok(())
}

fn write_list<O: ByteOrder>(list: &List, out: &mut Vec<u8>) -> Result<()> {
    if list.element_tag_id() == TagID::End && !list.is_empty() {
        cold_path();
        return Err(Error::InvalidTagType(TagID::End as u8));
    }
    out.push(list.element_tag_id() as u8);
    write_len::<O>(list.len(), out)?;
    for item in list {
        if item.tag_id() != list.element_tag_id() {
            cold_path();
            return Err(Error::TagMismatch(list.element_tag_id(), item.tag_id()));
        }
        write_payload::<O>(item, out)?;
    }
    Ok(())
}

fn write_compound<O: ByteOrder>(compound: &Compound, out: &mut Vec<u8>) -> Result<()> {
    for (name, value) in compound {
        if matches!(value, TagNode::End) {
            cold_path();
            return Err(Error::InvalidTagType(TagID::End as u8));
        }
        write_head::<O>(value.tag_id(), name, out)?;
        write_payload::<O>(value, out)?;
    }
    out.push(TagID::End as u8);
    Ok(())
}

/// Appends the payload of `value` (no tag id, no name) to `out`.
pub fn write_payload<O: ByteOrder>(value: &TagNode, out: &mut Vec<u8>) -> Result<()> {
    match value {
        TagNode::End => {}
        TagNode::Byte(value) => out.push(*value as u8),
        TagNode::Short(value) => {
            out.extend_from_slice(&byteorder::I16::<O>::new(*value).to_bytes());
        }
        TagNode::Int(value) => {
            out.extend_from_slice(&byteorder::I32::<O>::new(*value).to_bytes());
        }
        TagNode::Long(value) => {
            out.extend_from_slice(&byteorder::I64::<O>::new(*value).to_bytes());
        }
        TagNode::Float(value) => {
            out.extend_from_slice(&byteorder::F32::<O>::new(*value).to_bytes());
        }
        TagNode::Double(value) => {
            out.extend_from_slice(&byteorder::F64::<O>::new(*value).to_bytes());
        }
        TagNode::ByteArray(values) => {
            write_len::<O>(values.len(), out)?;
            out.extend(values.iter().map(|&b| b as u8));
        }
        TagNode::ShortArray(values) => {
            write_len::<O>(values.len(), out)?;
            out.reserve(values.len() * 2);
            for value in values {
                out.extend_from_slice(&byteorder::I16::<O>::new(*value).to_bytes());
            }
        }
        TagNode::IntArray(values) => {
            write_len::<O>(values.len(), out)?;
            out.reserve(values.len() * 4);
            for value in values {
                out.extend_from_slice(&byteorder::I32::<O>::new(*value).to_bytes());
            }
        }
        TagNode::LongArray(values) => {
            write_len::<O>(values.len(), out)?;
            out.reserve(values.len() * 8);
            for value in values {
                out.extend_from_slice(&byteorder::I64::<O>::new(*value).to_bytes());
            }
        }
        TagNode::String(value) => write_string::<O>(value, out)?,
        TagNode::List(list) => write_list::<O>(list, out)?,
        TagNode::Compound(compound) => write_compound::<O>(compound, out)?,
    }
    Ok(())
}

#[inline]
fn write_head<O: ByteOrder>(tag_id: TagID, name: &str, out: &mut Vec<u8>) -> Result<()> {
    // TAG ID
    out.push(tag_id as u8);

    // NAME
    write_string::<O>(name, out)
}

/// Encodes a complete NBT document.
///
/// A root of [`TagNode::End`] is written as the single byte `0`.
pub fn write<O: ByteOrder>(root: &NamedTag) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    write_into::<O>(root, &mut out)?;
    Ok(out)
}

/// Appends the encoding of `root` to `out`.
pub fn write_into<O: ByteOrder>(root: &NamedTag, out: &mut Vec<u8>) -> Result<()> {
    if matches!(root.value, TagNode::End) {
        cold_path();
        out.push(TagID::End as u8);
        return Ok(());
    }
    write_head::<O>(root.value.tag_id(), &root.name, out)?;
    write_payload::<O>(&root.value, out)
}

/// Encodes `root` and writes it to `writer`.
pub fn write_to_writer<O: ByteOrder>(root: &NamedTag, mut writer: impl Write) -> Result<()> {
    let buf = write::<O>(root)?;
    writer.write_all(&buf).map_err(Error::IO)
}
