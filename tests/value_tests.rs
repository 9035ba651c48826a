use na_world::{Compound, Error, List, TagID, TagNode};

#[test]
fn test_compound_preserves_insertion_order() {
    let mut compound = Compound::new();
    compound.insert("b", 1i32);
    compound.insert("a", 2i32);
    compound.insert("c", 3i32);

    assert_eq!(compound.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
}

#[test]
fn test_compound_replace_keeps_position() {
    let mut compound = Compound::new();
    compound.insert("b", 1i32);
    compound.insert("a", 2i32);

    assert_eq!(compound.insert("b", 5i32), Some(TagNode::Int(1)));
    assert_eq!(compound.keys().collect::<Vec<_>>(), ["b", "a"]);
    assert_eq!(compound.get_int("b"), Some(5));
}

#[test]
fn test_compound_remove_keeps_order() {
    let mut compound: Compound = [("x", 1i32), ("y", 2), ("z", 3)].into_iter().collect();

    assert_eq!(compound.remove("y"), Some(TagNode::Int(2)));
    assert_eq!(compound.remove("y"), None);
    assert_eq!(compound.keys().collect::<Vec<_>>(), ["x", "z"]);
}

#[test]
fn test_compound_ignore_case_lookup() {
    let mut compound = Compound::new();
    compound.insert("SpawnX", 10i32);

    assert!(compound.get("spawnx").is_none());
    assert_eq!(compound.get_ignore_case("spawnx"), Some(&TagNode::Int(10)));
    assert_eq!(compound.get_ignore_case("SpawnX"), Some(&TagNode::Int(10)));

    if let Some(value) = compound.get_ignore_case_mut("SPAWNX") {
        *value = TagNode::Int(11);
    }
    assert_eq!(compound.get_int("SpawnX"), Some(11));
}

#[test]
fn test_compound_entry_creates_nested() {
    let mut compound = Compound::new();
    compound.insert("Data", 5i32);
    compound.compound_entry("Data").insert("x", 1i8);
    compound.compound_entry("Other").insert("y", 2i8);

    assert_eq!(compound.get_compound("Data").and_then(|c| c.get_byte("x")), Some(1));
    assert_eq!(compound.get_compound("Other").and_then(|c| c.get_byte("y")), Some(2));
}

#[test]
fn test_compound_entry_reuses_case_variant() {
    let mut compound = Compound::new();
    compound.compound_entry("data").insert("x", 1i8);
    compound.compound_entry("Data").insert("y", 2i8);

    assert_eq!(compound.keys().collect::<Vec<_>>(), ["data"]);
    let data = compound.get_compound("data").unwrap();
    assert_eq!(data.get_byte("x"), Some(1));
    assert_eq!(data.get_byte("y"), Some(2));
}

#[test]
fn test_compound_insert_and_remove_ignore_case() {
    let mut compound: Compound = [("spawnx", 1i32), ("y", 2)].into_iter().collect();

    assert_eq!(compound.insert_ignore_case("SpawnX", 7i32), Some(TagNode::Int(1)));
    assert_eq!(compound.keys().collect::<Vec<_>>(), ["spawnx", "y"]);
    assert_eq!(compound.get_int("spawnx"), Some(7));

    assert_eq!(compound.insert_ignore_case("z", 3i32), None);
    assert_eq!(compound.remove_ignore_case("Y"), Some(TagNode::Int(2)));
    assert_eq!(compound.keys().collect::<Vec<_>>(), ["spawnx", "z"]);
}

#[test]
fn test_make_compound_replaces_other_values() {
    let mut node = TagNode::Int(3);
    node.make_compound().insert("a", "b");
    assert_eq!(node.as_compound().and_then(|c| c.get_str("a")), Some("b"));
}

#[test]
fn test_list_adopts_first_element_type() {
    let mut list = List::new();
    assert_eq!(list.element_tag_id(), TagID::End);

    list.push(1i32).unwrap();
    assert_eq!(list.element_tag_id(), TagID::Int);
    list.push(2i32).unwrap();

    match list.push(3i64) {
        Err(Error::TagMismatch(TagID::Int, TagID::Long)) => {}
        other => panic!("Expected TagMismatch, got {other:?}"),
    }
    assert_eq!(list.len(), 2);
}

#[test]
fn test_typed_empty_list_rejects_other_types() {
    let mut list = List::of(TagID::Compound);
    assert!(list.is_empty());

    match list.push("nope") {
        Err(Error::TagMismatch(TagID::Compound, TagID::String)) => {}
        other => panic!("Expected TagMismatch, got {other:?}"),
    }
    list.push(Compound::new()).unwrap();
    assert_eq!(list.len(), 1);
}

#[test]
fn test_list_from_vec() {
    let list = List::from_vec(vec![TagNode::Short(1), TagNode::Short(2)]).unwrap();
    assert_eq!(list.element_tag_id(), TagID::Short);
    assert_eq!(list.as_slice(), &[TagNode::Short(1), TagNode::Short(2)]);

    match List::from_vec(vec![TagNode::Short(1), TagNode::Byte(2)]) {
        Err(Error::TagMismatch(TagID::Short, TagID::Byte)) => {}
        other => panic!("Expected TagMismatch, got {other:?}"),
    }
}
