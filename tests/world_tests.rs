use std::{fs, path::Path, rc::Rc};

use na_world::{
    ANVIL_VERSION, BigEndian, Compression, Dimension, Error, GameRules, LEVEL_FILE, Level,
    DATA_DIR, List, NamedTag, NbtErrorKind, NbtErrors, NbtWorld, PLAYER_DIR, REGION_DIR,
    TagNode, WorldConfig, WorldFormat, read_compressed, write_compressed,
};
use tempfile::tempdir;

// ==================== Helper Functions ====================

fn open_err(path: impl AsRef<Path>) -> NbtErrors {
    match NbtWorld::open(path) {
        Ok(_) => panic!("Expected the world to be rejected"),
        Err(errors) => errors,
    }
}

fn write_level(dir: &Path, tree: &NamedTag) {
    let data = write_compressed::<BigEndian>(tree, Compression::Gzip).unwrap();
    fs::write(dir.join(LEVEL_FILE), data).unwrap();
}

fn level_tree(version: Option<i32>) -> NamedTag {
    Level::new(version).into_tree()
}

fn edit_data(tree: &mut NamedTag) -> &mut na_world::Compound {
    tree.value
        .as_compound_mut()
        .unwrap()
        .get_compound_mut("Data")
        .unwrap()
}

fn first_message(errors: &NbtErrors) -> &str {
    &errors.errors[0].message
}

// ==================== Format Detection ====================

#[test]
fn test_create_save_reopen_anvil() {
    let dir = tempdir().unwrap();
    let mut world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    world.level_mut().set_level_name("Test Realm");
    world.level_mut().set_spawn(10, 64, -5);
    assert_eq!(world.save().unwrap(), 0);

    let opened = NbtWorld::open(dir.path()).unwrap();
    assert!(opened.report.is_empty(), "{:?}", opened.report);
    let world = opened.world;
    assert_eq!(world.format(), WorldFormat::Anvil);
    assert_eq!(world.level().version(), Some(ANVIL_VERSION));
    assert_eq!(world.level().level_name(), "Test Realm");
    assert_eq!(world.level().spawn(), (10, 64, -5));
    assert_eq!(world.level().game_rules(), GameRules::default());
}

#[test]
fn test_detect_beta() {
    let dir = tempdir().unwrap();
    NbtWorld::create(dir.path(), WorldFormat::Beta)
        .unwrap()
        .save()
        .unwrap();

    let world = NbtWorld::open(dir.path()).unwrap().world;
    assert_eq!(world.format(), WorldFormat::Beta);
}

#[test]
fn test_detect_alpha() {
    let dir = tempdir().unwrap();
    NbtWorld::create(dir.path(), WorldFormat::Alpha)
        .unwrap()
        .save()
        .unwrap();
    assert!(!dir.path().join(REGION_DIR).exists());

    let world = NbtWorld::open(dir.path()).unwrap().world;
    assert_eq!(world.format(), WorldFormat::Alpha);
    assert_eq!(world.level().version(), None);
}

#[test]
fn test_open_via_level_file() {
    let dir = tempdir().unwrap();
    NbtWorld::create(dir.path(), WorldFormat::Anvil)
        .unwrap()
        .save()
        .unwrap();

    let world = NbtWorld::open(dir.path().join(LEVEL_FILE)).unwrap().world;
    assert_eq!(world.format(), WorldFormat::Anvil);
    assert_eq!(world.path(), dir.path());
    assert_eq!(world.level_path(), dir.path().join(LEVEL_FILE));
}

#[test]
fn test_open_as_wrong_format() {
    let dir = tempdir().unwrap();
    NbtWorld::create(dir.path(), WorldFormat::Anvil)
        .unwrap()
        .save()
        .unwrap();

    match NbtWorld::open_as(dir.path(), WorldFormat::Beta) {
        Ok(_) => panic!("Expected InvalidVersion"),
        Err(errors) => {
            assert!(errors.has_kind(NbtErrorKind::InvalidVersion));
            assert_eq!(
                first_message(&errors),
                "This world does not use the Beta file format."
            );
        }
    }
}

#[test]
fn test_unknown_version() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    write_level(dir.path(), &level_tree(Some(42)));

    let errors = open_err(dir.path());
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].kind, NbtErrorKind::IoError);
    assert_eq!(first_message(&errors), "Unknown world file format.");
}

#[test]
fn test_wrongly_typed_version_is_not_alpha() {
    let dir = tempdir().unwrap();
    let mut tree = level_tree(None);
    edit_data(&mut tree).insert("version", "19133");
    write_level(dir.path(), &tree);

    let errors = open_err(dir.path());
    assert_eq!(first_message(&errors), "Unknown world file format.");
}

#[test]
fn test_truncated_level_stops_detection() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(LEVEL_FILE), [0x0A, 0x00, 0x00, 0x04]).unwrap();

    let errors = open_err(dir.path());
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].kind, NbtErrorKind::Exception);
    assert!(!errors.has_kind(NbtErrorKind::InvalidVersion));
}

// ==================== Open Failures ====================

#[test]
fn test_missing_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nowhere");

    let errors = open_err(&missing);
    assert_eq!(errors.errors[0].kind, NbtErrorKind::IoError);
    assert_eq!(
        first_message(&errors),
        format!("Directory \"{}\" not found", missing.display())
    );
}

#[test]
fn test_missing_level_file() {
    let dir = tempdir().unwrap();

    let errors = open_err(dir.path());
    assert_eq!(errors.errors[0].kind, NbtErrorKind::IoError);
    assert_eq!(
        first_message(&errors),
        format!("Data file \"level.dat\" not found in \"{}\"", dir.path().display())
    );
}

#[test]
fn test_missing_region_directory() {
    let dir = tempdir().unwrap();
    write_level(dir.path(), &level_tree(Some(ANVIL_VERSION)));

    let errors = open_err(dir.path());
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].kind, NbtErrorKind::IoError);
    assert_eq!(first_message(&errors), "Directory region does not exist.");
}

#[test]
fn test_schema_errors_are_reported() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    let mut tree = level_tree(Some(ANVIL_VERSION));
    edit_data(&mut tree).insert("SpawnX", "far away");
    write_level(dir.path(), &tree);

    let errors = open_err(dir.path());
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].kind, NbtErrorKind::InvalidTagType);
    assert_eq!(errors.errors[0].path, ["Data", "SpawnX"]);
}

#[test]
fn test_missing_required_level_field() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    let mut tree = level_tree(Some(ANVIL_VERSION));
    edit_data(&mut tree).remove("RandomSeed");
    write_level(dir.path(), &tree);

    let errors = open_err(dir.path());
    assert_eq!(errors.errors[0].kind, NbtErrorKind::MissingTag);
    assert_eq!(
        errors.errors[0].to_string(),
        "MissingTag /Data/RandomSeed: Required tag is missing."
    );
}

// ==================== Repairs And Warnings ====================

#[test]
fn test_game_rules_are_created() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    let mut tree = level_tree(Some(ANVIL_VERSION));
    edit_data(&mut tree).remove("GameRules");
    edit_data(&mut tree).remove("LastPlayed");
    write_level(dir.path(), &tree);

    let opened = NbtWorld::open(dir.path()).unwrap();
    assert!(opened.report.is_empty());
    let level = opened.world.level();
    assert_eq!(level.game_rules(), GameRules::default());
    assert_eq!(level.last_played(), 0);
}

#[test]
fn test_unknown_level_field_is_a_warning() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    let mut tree = level_tree(Some(ANVIL_VERSION));
    edit_data(&mut tree).insert("Mystery", 7i32);
    write_level(dir.path(), &tree);

    let opened = NbtWorld::open(dir.path()).unwrap();
    assert!(opened.report.is_success());
    assert_eq!(opened.report.warnings.len(), 1);
    assert_eq!(opened.report.warnings[0].kind, NbtErrorKind::UnexpectedTag);
    assert_eq!(opened.report.warnings[0].path, ["Data", "Mystery"]);
}

#[test]
fn test_level_keys_match_ignoring_case() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(REGION_DIR)).unwrap();
    let mut tree = level_tree(Some(ANVIL_VERSION));
    let root = tree.value.as_compound_mut().unwrap();
    let mut data = root.remove("Data").unwrap();
    let fields = data.as_compound_mut().unwrap();
    fields.remove("SpawnX");
    fields.insert("spawnx", 42i32);
    fields.insert("levelname", "Lower");
    fields.remove("LevelName");
    root.insert("data", data);
    write_level(dir.path(), &tree);

    let mut world = NbtWorld::open(dir.path()).unwrap().world;
    assert_eq!(world.format(), WorldFormat::Anvil);
    assert_eq!(world.level().spawn().0, 42);
    assert_eq!(world.level().level_name(), "Lower");

    world.level_mut().set_spawn(7, 8, 9);
    world.save().unwrap();

    let raw = fs::read(dir.path().join(LEVEL_FILE)).unwrap();
    let saved = read_compressed::<BigEndian>(&raw).unwrap();
    let root = saved.value.as_compound().unwrap();
    assert_eq!(root.keys().collect::<Vec<_>>(), ["data"]);
    let data = root.get_compound("data").unwrap();
    assert_eq!(data.get_int("spawnx"), Some(7));
    assert!(data.get("SpawnX").is_none());
}

#[test]
fn test_level_without_data_is_missing_tag() {
    let tree = NamedTag::new("", na_world::Compound::new());
    match Level::from_tree(tree) {
        Err(Error::Invalid(errors)) => {
            assert_eq!(errors.errors[0].kind, NbtErrorKind::MissingTag);
            assert_eq!(errors.errors[0].path, ["Data"]);
        }
        other => panic!("Expected MissingTag, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_game_rules_round_trip() {
    let dir = tempdir().unwrap();
    let mut world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    let rules = GameRules {
        keep_inventory: true,
        random_tick_speed: 7,
        ..GameRules::default()
    };
    world.level_mut().set_game_rules(&rules);
    world.save().unwrap();

    let world = NbtWorld::open(dir.path()).unwrap().world;
    assert_eq!(world.level().game_rules(), rules);
}

// ==================== Dimensions ====================

#[test]
fn test_dimension_managers_are_shared() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    assert!(world.chunk_cache(Dimension::Default).is_none());

    let first = world.chunk_manager(0).unwrap();
    let second = world.chunk_manager("DIM0").unwrap();
    let third = world.chunk_manager(Dimension::Default).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(Rc::ptr_eq(&first, &third));

    let blocks = world.block_manager("").unwrap();
    assert!(Rc::ptr_eq(blocks.chunk_manager(), &first));

    let cache = world.chunk_cache(0).unwrap();
    assert!(Rc::ptr_eq(&cache, first.cache()));
    assert_eq!(world.opened_dimensions(), [Dimension::Default]);
}

#[test]
fn test_nether_gets_its_own_directory() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    assert!(world.chunk_cache(-1).is_none());

    let nether = world.block_manager(Dimension::NETHER).unwrap();
    let overworld = world.block_manager(0).unwrap();
    assert!(!Rc::ptr_eq(&nether, &overworld));
    assert!(dir.path().join("DIM-1").join(REGION_DIR).is_dir());
    assert!(world.chunk_cache("DIM-1").is_some());
}

#[test]
fn test_dimension_names_stay_inside_the_world() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("world");
    let world = NbtWorld::create(&root, WorldFormat::Anvil).unwrap();

    for name in ["../escape", "a/b", "..", "a\\b"] {
        match world.chunk_manager(name) {
            Err(Error::IO(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput),
            Ok(_) => panic!("Expected {name:?} to be rejected"),
            Err(e) => panic!("Expected InvalidInput for {name:?}, got {e:?}"),
        }
    }
    assert!(!dir.path().join("escape").exists());
    assert!(world.opened_dimensions().is_empty());

    assert!(world.chunk_manager("custom").is_ok());
    assert!(root.join("custom").join(REGION_DIR).is_dir());
}

#[test]
fn test_region_manager_on_alpha() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Alpha).unwrap();
    match world.region_manager(0) {
        Err(Error::Unsupported(_)) => {}
        Ok(_) => panic!("Expected Unsupported"),
        Err(e) => panic!("Expected Unsupported, got {e:?}"),
    }
}

#[test]
fn test_region_manager_directory() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Beta).unwrap();
    let regions = world.region_manager(1).unwrap();
    assert_eq!(regions.borrow().directory(), dir.path().join("DIM1").join(REGION_DIR));
    assert_eq!(regions.borrow().extension(), "mcr");
}

#[test]
fn test_cache_size_from_config() {
    let dir = tempdir().unwrap();
    let config = WorldConfig::default().with_preferred_cache_size(4);
    let world = NbtWorld::create_with(dir.path(), WorldFormat::Anvil, config).unwrap();
    world.chunk_manager(0).unwrap();
    assert_eq!(world.chunk_cache(0).unwrap().borrow().capacity(), 4);
    assert_eq!(world.config().preferred_cache_size, 4);
}

#[test]
fn test_dimension_parsing() {
    assert_eq!(Dimension::parse(""), Dimension::Default);
    assert_eq!(Dimension::parse("DIM0"), Dimension::Default);
    assert_eq!(Dimension::parse("DIM-1"), Dimension::NETHER);
    assert_eq!(Dimension::parse("DIM1"), Dimension::THE_END);
    assert_eq!(Dimension::parse("custom"), Dimension::Named("custom".into()));
    assert_eq!(Dimension::Id(0).canonical(), Dimension::Default);
    assert_eq!(Dimension::Named("DIM7".into()).canonical(), Dimension::Id(7));
    assert_eq!(Dimension::Default.dir_name(), None);
    assert_eq!(Dimension::NETHER.dir_name().as_deref(), Some("DIM-1"));
}

// ==================== Blocks ====================

fn block_round_trip(format: WorldFormat) {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), format).unwrap();
    let blocks = world.block_manager(0).unwrap();
    assert_eq!(blocks.block_id(100, 70, -20).unwrap(), None);
    assert!(blocks.set_block_id(100, 70, -20, 7).unwrap());
    assert!(blocks.set_block_id(101, 70, -20, 3).unwrap());
    assert_eq!(blocks.block_id(100, 70, -20).unwrap(), Some(7));
    assert_eq!(world.save().unwrap(), 1);
    assert_eq!(world.save().unwrap(), 0);
    drop(blocks);
    drop(world);

    let opened = NbtWorld::open(dir.path()).unwrap();
    assert_eq!(opened.world.format(), format);
    let blocks = opened.world.block_manager(0).unwrap();
    assert_eq!(blocks.block_id(100, 70, -20).unwrap(), Some(7));
    assert_eq!(blocks.block_id(101, 70, -20).unwrap(), Some(3));
    assert_eq!(blocks.block_id(102, 70, -20).unwrap(), Some(0));
    assert_eq!(blocks.block_id(100, 71, -20).unwrap(), Some(0));
}

#[test]
fn test_blocks_anvil() {
    block_round_trip(WorldFormat::Anvil);
}

#[test]
fn test_blocks_beta() {
    block_round_trip(WorldFormat::Beta);
}

#[test]
fn test_blocks_alpha() {
    block_round_trip(WorldFormat::Alpha);
}

#[test]
fn test_anvil_region_file_name() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    world.block_manager(0).unwrap().set_block_id(-1, 0, -1, 1).unwrap();
    world.save().unwrap();
    assert!(dir.path().join(REGION_DIR).join("r.-1.-1.mca").is_file());
}

#[test]
fn test_block_height_limits() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Beta).unwrap();
    let blocks = world.block_manager(0).unwrap();
    assert_eq!(blocks.height(), 128);
    assert!(!blocks.set_block_id(0, 128, 0, 1).unwrap());
    assert!(!blocks.set_block_id(0, -1, 0, 1).unwrap());
    assert_eq!(world.save().unwrap(), 0);

    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    let blocks = world.block_manager(0).unwrap();
    assert_eq!(blocks.height(), 256);
    assert!(blocks.set_block_id(0, 255, 0, 1).unwrap());
    assert_eq!(blocks.block_id(0, 255, 0).unwrap(), Some(1));
    assert_eq!(blocks.block_id(0, 256, 0).unwrap(), None);
}

#[test]
fn test_blocks_survive_tiny_cache() {
    let dir = tempdir().unwrap();
    let config = WorldConfig::default().with_preferred_cache_size(0);
    let world = NbtWorld::create_with(dir.path(), WorldFormat::Anvil, config).unwrap();
    let blocks = world.block_manager(0).unwrap();
    for x in 0..4 {
        assert!(blocks.set_block_id(x * 16, 10, 0, 5).unwrap());
    }
    assert_eq!(world.save().unwrap(), 4);
    assert_eq!(world.chunk_cache(0).unwrap().borrow().len(), 0);
    assert_eq!(blocks.block_id(48, 10, 0).unwrap(), Some(5));
}

// ==================== Players And Data ====================

fn player(x: f64, y: f64, z: f64) -> NamedTag {
    let mut player = na_world::Compound::new();
    let pos = List::from_vec(vec![x.into(), y.into(), z.into()]).unwrap();
    player.insert("Pos", pos);
    player.insert("Health", 20i16);
    NamedTag::new("", player)
}

#[test]
fn test_player_manager_is_shared() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();

    let first = world.player_manager();
    let second = world.player_manager();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.directory(), dir.path().join(PLAYER_DIR));
}

#[test]
fn test_player_round_trip() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Beta).unwrap();
    world.save().unwrap();
    let players = world.player_manager();
    assert!(players.players().unwrap().is_empty());
    assert!(players.get("Steve").unwrap().is_none());

    players.set("Steve", &player(1.5, 64.0, -3.0)).unwrap();
    players.set("Alex", &player(0.0, 70.0, 0.0)).unwrap();
    assert!(players.exists("Steve"));
    assert!(dir.path().join(PLAYER_DIR).join("Steve.dat").is_file());
    assert_eq!(players.players().unwrap(), ["Alex", "Steve"]);

    let reopened = NbtWorld::open(dir.path()).unwrap().world;
    let steve = reopened.player_manager().get("Steve").unwrap().unwrap();
    let steve = steve.value.as_compound().unwrap();
    let pos = steve.get("Pos").and_then(TagNode::as_list).unwrap();
    assert_eq!(pos.get(2), Some(&TagNode::Double(-3.0)));
    assert_eq!(steve.get_byte("OnGround"), Some(0));
    assert_eq!(steve.get_int("Dimension"), Some(0));

    assert!(players.delete("Steve").unwrap());
    assert!(!players.delete("Steve").unwrap());
    assert!(!players.exists("Steve"));
    assert_eq!(players.players().unwrap(), ["Alex"]);
}

#[test]
fn test_invalid_player_is_not_written() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    let players = world.player_manager();

    let mut broken = player(0.0, 0.0, 0.0);
    broken.value.as_compound_mut().unwrap().remove("Pos");
    match players.set("Notch", &broken) {
        Err(Error::Invalid(errors)) => {
            assert_eq!(errors.errors[0].kind, NbtErrorKind::MissingTag);
            assert_eq!(errors.errors[0].path, ["Pos"]);
        }
        other => panic!("Expected Invalid, got {other:?}"),
    }
    assert!(!players.exists("Notch"));
}

#[test]
fn test_corrupt_player_file_is_rejected() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    let players = world.player_manager();

    let mut short_pos = na_world::Compound::new();
    short_pos.insert("Pos", List::from_vec(vec![1.0f64.into()]).unwrap());
    let data = write_compressed::<BigEndian>(&NamedTag::new("", short_pos), Compression::Gzip).unwrap();
    fs::create_dir_all(players.directory()).unwrap();
    fs::write(players.player_path("Herobrine").unwrap(), data).unwrap();

    match players.get("Herobrine") {
        Err(Error::Invalid(errors)) => {
            assert_eq!(errors.errors[0].kind, NbtErrorKind::InvalidTagValue);
        }
        other => panic!("Expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_player_names_stay_inside_the_world() {
    let dir = tempdir().unwrap();
    let world = NbtWorld::create(dir.path().join("world"), WorldFormat::Anvil).unwrap();
    let players = world.player_manager();

    match players.set("../outside", &player(0.0, 0.0, 0.0)) {
        Err(Error::IO(e)) => assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
    assert!(!players.exists(".."));
    assert!(!dir.path().join("outside.dat").exists());
}

#[test]
fn test_data_directory() {
    let dir = tempdir().unwrap();
    let mut world = NbtWorld::create(dir.path(), WorldFormat::Anvil).unwrap();
    assert_eq!(world.data_directory(), dir.path().join(DATA_DIR));

    world.set_data_directory("maps");
    assert_eq!(world.data_directory(), dir.path().join("maps"));
}
