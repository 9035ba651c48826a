use na_world::{
    BigEndian, ChunkLayout, CompoundSchema, Level, LittleEndian, SchemaNode, TagID, read,
    read_compressed, repair, verify, write,
};

fn probe_schema() -> SchemaNode {
    SchemaNode::compound(
        "",
        CompoundSchema::new()
            .with(SchemaNode::int("x"))
            .with(SchemaNode::string("name").with_length(16).optional())
            .with(SchemaNode::byte_array("data").with_length(4).create_on_missing())
            .with(
                SchemaNode::list("items", TagID::Compound)
                    .with_item_schema(SchemaNode::compound(
                        "",
                        CompoundSchema::new().with(SchemaNode::short("id")),
                    ))
                    .optional(),
            )
            .with(SchemaNode::either(
                "value",
                vec![SchemaNode::long("value"), SchemaNode::string("value")],
            ).create_on_missing()),
    )
}

pub fn test_codec(data: &[u8]) {
    if let Ok(root) = read::<BigEndian>(data) {
        // lossy string decoding may grow a string past the length limit
        if let Ok(encoded) = write::<BigEndian>(&root) {
            let again = read::<BigEndian>(&encoded).expect("encoded tree must decode");
            assert_eq!(write::<BigEndian>(&again).ok(), Some(encoded));
        }
        let _ = write::<LittleEndian>(&root);
    }
    if let Ok(root) = read::<LittleEndian>(data) {
        let _ = write::<LittleEndian>(&root);
        let _ = write::<BigEndian>(&root);
    }
    let _ = read_compressed::<BigEndian>(data);
}

pub fn test_verify(data: &[u8]) {
    let Ok(root) = read::<BigEndian>(data) else {
        return;
    };

    for schema in [
        probe_schema(),
        Level::schema(),
        ChunkLayout::Legacy.schema(),
        ChunkLayout::Sectioned.schema(),
    ] {
        let mut tree = root.value.clone();
        let first = verify(&mut tree, &schema);
        if first.is_success() {
            // a repaired tree must pass again
            let second = repair(Some(tree), &schema);
            assert!(second.report.errors.is_empty());
        }
    }
}

pub fn test(data: &[u8]) {
    test_codec(data);
    test_verify(data);
}
