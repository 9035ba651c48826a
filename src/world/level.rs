//! The `level.dat` document.
//!
//! The file holds a single root compound with one child, `Data`, carrying
//! world-wide settings. [`Level`] keeps the verified tree and exposes typed
//! accessors over it; fields a caller never touches round-trip unchanged.

use crate::{
    Compound, CompoundSchema, Error, NamedTag, NbtError, NbtErrorKind, NbtErrors, Result,
    SchemaNode, TagNode,
};

/// Name of the compound below the root that holds the level settings.
pub const DATA_KEY: &str = "Data";
/// Key of the format version inside [`DATA_KEY`].
pub const VERSION_KEY: &str = "version";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameType {
    #[default]
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

impl GameType {
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(GameType::Survival),
            1 => Some(GameType::Creative),
            2 => Some(GameType::Adventure),
            3 => Some(GameType::Spectator),
            _ => None,
        }
    }
}

/// World rules. Stored as strings inside the `GameRules` compound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameRules {
    pub command_block_output: bool,
    pub do_fire_tick: bool,
    pub do_mob_loot: bool,
    pub do_mob_spawning: bool,
    pub do_tile_drops: bool,
    pub keep_inventory: bool,
    pub mob_griefing: bool,
    pub do_daylight_cycle: bool,
    pub log_admin_commands: bool,
    pub natural_regeneration: bool,
    pub random_tick_speed: i32,
    pub send_command_feedback: bool,
    pub show_death_messages: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            command_block_output: true,
            do_fire_tick: true,
            do_mob_loot: true,
            do_mob_spawning: true,
            do_tile_drops: true,
            keep_inventory: false,
            mob_griefing: true,
            do_daylight_cycle: true,
            log_admin_commands: true,
            natural_regeneration: true,
            random_tick_speed: 3,
            send_command_feedback: true,
            show_death_messages: true,
        }
    }
}

macro_rules! bool_rules {
    ($($field:ident => $key:literal),* $(,)?) => {
        const BOOL_RULES: &[&str] = &[$($key),*];

        impl GameRules {
            /// Reads rules from their stored form. Absent or unparsable
            /// entries keep their default.
            pub fn from_compound(compound: &Compound) -> Self {
                let defaults = Self::default();
                Self {
                    $($field: parse_rule(compound, $key).unwrap_or(defaults.$field),)*
                    random_tick_speed: parse_rule(compound, "randomTickSpeed")
                        .unwrap_or(defaults.random_tick_speed),
                }
            }

            pub fn to_compound(&self) -> Compound {
                let mut compound = Compound::new();
                $(compound.insert($key, self.$field.to_string());)*
                compound.insert("randomTickSpeed", self.random_tick_speed.to_string());
                compound
            }
        }
    };
}

bool_rules! {
    command_block_output => "commandBlockOutput",
    do_fire_tick => "doFireTick",
    do_mob_loot => "doMobLoot",
    do_mob_spawning => "doMobSpawning",
    do_tile_drops => "doTileDrops",
    keep_inventory => "keepInventory",
    mob_griefing => "mobGriefing",
    do_daylight_cycle => "doDaylightCycle",
    log_admin_commands => "logAdminCommands",
    natural_regeneration => "naturalRegeneration",
    send_command_feedback => "sendCommandFeedback",
    show_death_messages => "showDeathMessages",
}

fn parse_rule<T: std::str::FromStr>(compound: &Compound, key: &str) -> Option<T> {
    compound.get_ignore_case(key)?.as_str()?.trim().parse().ok()
}

impl GameRules {
    pub fn schema() -> CompoundSchema {
        BOOL_RULES
            .iter()
            .chain(&["randomTickSpeed"])
            .map(|key| SchemaNode::string(*key).optional())
            .collect()
    }
}

/// Root metadata of a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    root: NamedTag,
}

impl Level {
    /// Schema of the whole `level.dat` tree.
    pub fn schema() -> SchemaNode {
        let data = CompoundSchema::new()
            .with(SchemaNode::long("Time"))
            .with(SchemaNode::long("LastPlayed").create_on_missing())
            .with(SchemaNode::compound("Player", CompoundSchema::new()).optional())
            .with(SchemaNode::int("SpawnX"))
            .with(SchemaNode::int("SpawnY"))
            .with(SchemaNode::int("SpawnZ"))
            .with(SchemaNode::long("SizeOnDisk").create_on_missing())
            .with(SchemaNode::long("RandomSeed"))
            .with(SchemaNode::int(VERSION_KEY).optional())
            .with(SchemaNode::string("LevelName").optional())
            .with(SchemaNode::string("generatorName").optional())
            .with(SchemaNode::int("generatorVersion").optional())
            .with(SchemaNode::string("generatorOptions").optional())
            .with(SchemaNode::byte("raining").optional())
            .with(SchemaNode::int("rainTime").optional())
            .with(SchemaNode::byte("thundering").optional())
            .with(SchemaNode::int("thunderTime").optional())
            .with(SchemaNode::int("GameType").optional())
            .with(SchemaNode::byte("MapFeatures").optional())
            .with(SchemaNode::byte("hardcore").optional())
            .with(SchemaNode::byte("allowCommands").optional())
            .with(SchemaNode::long("DayTime").optional())
            .with(SchemaNode::compound("GameRules", GameRules::schema()).create_on_missing());

        SchemaNode::compound("", CompoundSchema::new().with(SchemaNode::compound(DATA_KEY, data)))
    }

    /// Builds a fresh document. `version` is omitted for Alpha worlds.
    pub fn new(version: Option<i32>) -> Self {
        let value = Self::schema().build_default_tree();
        let mut level = Self {
            root: NamedTag::new("", value),
        };
        level.set_version(version);
        level.set_level_name("World");
        level.set_game_rules(&GameRules::default());
        level
    }

    /// Wraps an already verified tree. Keys match ignoring ASCII case, as
    /// they do during verification.
    pub fn from_tree(root: NamedTag) -> Result<Self> {
        if Self::data_of(&root.value).is_some() {
            return Ok(Self { root });
        }
        let missing = NbtError::new(
            NbtErrorKind::MissingTag,
            &[DATA_KEY.to_owned()],
            "Required tag is missing.",
        );
        Err(Error::Invalid(NbtErrors::new(vec![missing], Vec::new())))
    }

    fn data_of(root: &TagNode) -> Option<&Compound> {
        root.as_compound()?.get_ignore_case(DATA_KEY)?.as_compound()
    }

    /// Reads `Data/version` from a decoded document.
    pub fn extract_version(root: &TagNode) -> Option<i32> {
        Self::version_field(root)?.as_int()
    }

    /// The raw `Data/version` tag, whatever its type.
    pub fn version_field(root: &TagNode) -> Option<&TagNode> {
        root.as_compound()?
            .get_ignore_case(DATA_KEY)?
            .as_compound()?
            .get_ignore_case(VERSION_KEY)
    }

    #[inline]
    pub fn tree(&self) -> &NamedTag {
        &self.root
    }

    #[inline]
    pub fn into_tree(self) -> NamedTag {
        self.root
    }

    fn data(&self) -> Option<&Compound> {
        Self::data_of(&self.root.value)
    }

    /// The `Data` compound, created if the tree lost it.
    pub fn data_mut(&mut self) -> &mut Compound {
        self.root.value.make_compound().compound_entry(DATA_KEY)
    }

    fn get(&self, key: &str) -> Option<&TagNode> {
        self.data()?.get_ignore_case(key)
    }

    fn get_i64(&self, key: &str) -> i64 {
        self.get(key).and_then(TagNode::to_i64).unwrap_or(0)
    }

    fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key)?.to_i64()?.try_into().ok()
    }

    fn set(&mut self, key: &str, value: impl Into<TagNode>) {
        self.data_mut().insert_ignore_case(key, value);
    }

    fn get_flag(&self, key: &str) -> bool {
        self.get_i64(key) != 0
    }

    pub fn version(&self) -> Option<i32> {
        self.get_i32(VERSION_KEY)
    }

    pub fn set_version(&mut self, version: Option<i32>) {
        match version {
            Some(version) => {
                self.set(VERSION_KEY, version);
            }
            None => {
                self.data_mut().remove_ignore_case(VERSION_KEY);
            }
        }
    }

    pub fn level_name(&self) -> &str {
        self.get("LevelName").and_then(TagNode::as_str).unwrap_or("")
    }

    pub fn set_level_name(&mut self, name: impl Into<String>) {
        self.set("LevelName", name.into());
    }

    pub fn spawn(&self) -> (i32, i32, i32) {
        let coord = |key| self.get_i32(key).unwrap_or(0);
        (coord("SpawnX"), coord("SpawnY"), coord("SpawnZ"))
    }

    pub fn set_spawn(&mut self, x: i32, y: i32, z: i32) {
        self.set("SpawnX", x);
        self.set("SpawnY", y);
        self.set("SpawnZ", z);
    }

    pub fn time(&self) -> i64 {
        self.get_i64("Time")
    }

    pub fn set_time(&mut self, time: i64) {
        self.set("Time", time);
    }

    pub fn last_played(&self) -> i64 {
        self.get_i64("LastPlayed")
    }

    pub fn set_last_played(&mut self, millis: i64) {
        self.set("LastPlayed", millis);
    }

    pub fn random_seed(&self) -> i64 {
        self.get_i64("RandomSeed")
    }

    pub fn set_random_seed(&mut self, seed: i64) {
        self.set("RandomSeed", seed);
    }

    /// Unknown ids read as [`GameType::Survival`].
    pub fn game_type(&self) -> GameType {
        self.get_i32("GameType")
            .and_then(GameType::from_i32)
            .unwrap_or_default()
    }

    pub fn set_game_type(&mut self, game_type: GameType) {
        self.set("GameType", game_type as i32);
    }

    pub fn hardcore(&self) -> bool {
        self.get_flag("hardcore")
    }

    pub fn set_hardcore(&mut self, hardcore: bool) {
        self.set("hardcore", hardcore);
    }

    pub fn raining(&self) -> bool {
        self.get_flag("raining")
    }

    pub fn set_raining(&mut self, raining: bool) {
        self.set("raining", raining);
    }

    pub fn thundering(&self) -> bool {
        self.get_flag("thundering")
    }

    pub fn set_thundering(&mut self, thundering: bool) {
        self.set("thundering", thundering);
    }

    pub fn game_rules(&self) -> GameRules {
        self.get("GameRules")
            .and_then(TagNode::as_compound)
            .map(GameRules::from_compound)
            .unwrap_or_default()
    }

    pub fn set_game_rules(&mut self, rules: &GameRules) {
        self.set("GameRules", rules.to_compound());
    }
}
