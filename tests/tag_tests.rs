//! Tests for TagID and TagNode classification

use na_world::{Compound, List, TagID, TagNode};

#[test]
fn test_tag_values() {
    assert_eq!(TagID::End as u8, 0);
    assert_eq!(TagID::Byte as u8, 1);
    assert_eq!(TagID::Short as u8, 2);
    assert_eq!(TagID::Int as u8, 3);
    assert_eq!(TagID::Long as u8, 4);
    assert_eq!(TagID::Float as u8, 5);
    assert_eq!(TagID::Double as u8, 6);
    assert_eq!(TagID::ByteArray as u8, 7);
    assert_eq!(TagID::String as u8, 8);
    assert_eq!(TagID::List as u8, 9);
    assert_eq!(TagID::Compound as u8, 10);
    assert_eq!(TagID::IntArray as u8, 11);
    assert_eq!(TagID::LongArray as u8, 12);
    assert_eq!(TagID::ShortArray as u8, 100);
}

#[test]
fn test_from_u8() {
    for id in 0..=12u8 {
        assert_eq!(TagID::from_u8(id).map(|tag| tag as u8), Some(id));
    }
    assert_eq!(TagID::from_u8(100), Some(TagID::ShortArray));
    assert_eq!(TagID::from_u8(13), None);
    assert_eq!(TagID::from_u8(99), None);
    assert_eq!(TagID::from_u8(255), None);
}

#[test]
fn test_tag_classification() {
    assert!(TagID::End.is_primitive());
    assert!(TagID::Double.is_primitive());
    assert!(!TagID::String.is_primitive());

    assert!(TagID::ByteArray.is_array());
    assert!(TagID::ShortArray.is_array());
    assert!(TagID::LongArray.is_array());
    assert!(!TagID::List.is_array());

    assert!(TagID::List.is_composite());
    assert!(TagID::Compound.is_composite());
    assert!(!TagID::IntArray.is_composite());
}

#[test]
fn test_tag_names() {
    assert_eq!(TagID::Int.to_string(), "int");
    assert_eq!(TagID::IntArray.to_string(), "int array");
    assert_eq!(TagID::ShortArray.name(), "short array");
    assert_eq!(TagID::Compound.name(), "compound");
}

#[test]
fn test_castability() {
    let byte = TagNode::Byte(1);
    assert!(byte.is_castable_to(TagID::Byte));
    assert!(byte.is_castable_to(TagID::Short));
    assert!(byte.is_castable_to(TagID::Int));
    assert!(byte.is_castable_to(TagID::Long));
    assert!(!byte.is_castable_to(TagID::Float));

    assert!(!TagNode::Short(1).is_castable_to(TagID::Byte));
    assert!(TagNode::Int(1).is_castable_to(TagID::Long));
    assert!(!TagNode::Long(1).is_castable_to(TagID::Int));
    assert!(TagNode::Float(1.0).is_castable_to(TagID::Double));
    assert!(!TagNode::Double(1.0).is_castable_to(TagID::Float));
    assert!(!TagNode::Int(1).is_castable_to(TagID::Double));

    assert!(TagNode::String("a".into()).is_castable_to(TagID::String));
    assert!(!TagNode::ByteArray(vec![]).is_castable_to(TagID::IntArray));
    assert!(TagNode::Compound(Compound::new()).is_castable_to(TagID::Compound));
}

#[test]
fn test_node_tag_ids() {
    assert_eq!(TagNode::End.tag_id(), TagID::End);
    assert_eq!(TagNode::Short(0).tag_id(), TagID::Short);
    assert_eq!(TagNode::ShortArray(vec![1]).tag_id(), TagID::ShortArray);
    assert_eq!(TagNode::List(List::new()).tag_id(), TagID::List);
    assert_eq!(TagNode::LongArray(vec![]).tag_id(), TagID::LongArray);
}

#[test]
fn test_from_conversions() {
    assert_eq!(TagNode::from(true), TagNode::Byte(1));
    assert_eq!(TagNode::from(()), TagNode::End);
    assert_eq!(TagNode::from("a"), TagNode::String("a".to_owned()));
    assert_eq!(TagNode::from(vec![1i32, 2]), TagNode::IntArray(vec![1, 2]));
    assert_eq!(TagNode::from(vec![1i16]), TagNode::ShortArray(vec![1]));
    assert_eq!(TagNode::from(2.5f64), TagNode::Double(2.5));
}

#[test]
fn test_accessors() {
    assert_eq!(TagNode::Int(7).as_int(), Some(7));
    assert_eq!(TagNode::Int(7).as_long(), None);
    assert_eq!(TagNode::Byte(-3).to_i64(), Some(-3));
    assert_eq!(TagNode::Long(1 << 40).to_i64(), Some(1 << 40));
    assert_eq!(TagNode::Float(1.0).to_i64(), None);
    assert_eq!(TagNode::String("abc".into()).as_str(), Some("abc"));
    assert!(TagNode::Int(1).as_compound().is_none());
}
