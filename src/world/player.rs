//! Per-player documents of multiplayer worlds.
//!
//! Player `name` lives at `<world>/players/<name>.dat`, a compressed NBT
//! document verified against [`PlayerManager::schema`] on the way in and out.

use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    BigEndian, CompoundSchema, Compression, Error, NamedTag, Result, SchemaNode, TagID,
    is_plain_name, read_compressed, verify, write_compressed,
};

/// Subdirectory of the world holding player files.
pub const PLAYER_DIR: &str = "players";

const PLAYER_EXTENSION: &str = "dat";

pub struct PlayerManager {
    dir: PathBuf,
    compression: Compression,
}

impl PlayerManager {
    pub fn new(dir: impl Into<PathBuf>, compression: Compression) -> Self {
        Self {
            dir: dir.into(),
            compression,
        }
    }

    #[inline]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn schema() -> SchemaNode {
        let player = CompoundSchema::new()
            .with(SchemaNode::list("Pos", TagID::Double).with_length(3))
            .with(SchemaNode::list("Motion", TagID::Double).with_length(3).optional())
            .with(SchemaNode::list("Rotation", TagID::Float).with_length(2).optional())
            .with(SchemaNode::float("FallDistance").optional())
            .with(SchemaNode::short("Fire").optional())
            .with(SchemaNode::short("Air").optional())
            .with(SchemaNode::byte("OnGround").create_on_missing())
            .with(SchemaNode::short("Health").optional())
            .with(SchemaNode::short("HurtTime").optional())
            .with(SchemaNode::short("DeathTime").optional())
            .with(SchemaNode::short("AttackTime").optional())
            .with(SchemaNode::int("Dimension").create_on_missing())
            .with(SchemaNode::list("Inventory", TagID::Compound).create_on_missing())
            .with(SchemaNode::list("EnderItems", TagID::Compound).optional())
            .with(SchemaNode::byte("Sleeping").optional())
            .with(SchemaNode::short("SleepTimer").optional())
            .with(SchemaNode::int("SpawnX").optional())
            .with(SchemaNode::int("SpawnY").optional())
            .with(SchemaNode::int("SpawnZ").optional())
            .with(SchemaNode::int("foodLevel").optional())
            .with(SchemaNode::int("XpLevel").optional())
            .with(SchemaNode::float("XpP").optional())
            .with(SchemaNode::int("XpTotal").optional())
            .with(SchemaNode::int("Score").optional())
            .with(SchemaNode::int("SelectedItemSlot").optional())
            .with(SchemaNode::int("playerGameType").optional())
            .with(SchemaNode::compound("abilities", CompoundSchema::new()).optional());

        SchemaNode::compound("", player)
    }

    /// File of player `name`. Names must be a single path component.
    pub fn player_path(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_name(name) {
            return Err(Error::IO(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid player name \"{name}\""),
            )));
        }
        Ok(self.dir.join(format!("{name}.{PLAYER_EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.player_path(name).is_ok_and(|path| path.is_file())
    }

    /// Loads player `name`, `None` if no file exists.
    ///
    /// Documents that fail verification are rejected with [`Error::Invalid`].
    pub fn get(&self, name: &str) -> Result<Option<NamedTag>> {
        let raw = match fs::read(self.player_path(name)?) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut player = read_compressed::<BigEndian>(&raw)?;
        let report = verify(&mut player.value, &Self::schema());
        if report.has_errors() {
            warn!("rejected player {name}: {report}");
            return Err(Error::Invalid(report));
        }
        for warning in &report.warnings {
            warn!("player {name}: {warning}");
        }
        Ok(Some(player))
    }

    /// Verifies `player` and writes it as player `name`.
    pub fn set(&self, name: &str, player: &NamedTag) -> Result<()> {
        let path = self.player_path(name)?;
        let mut player = player.clone();
        let report = verify(&mut player.value, &Self::schema());
        if report.has_errors() {
            return Err(Error::Invalid(report));
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(path, write_compressed::<BigEndian>(&player, self.compression)?)?;
        debug!("saved player {name}");
        Ok(())
    }

    /// Removes player `name`. Returns `false` if there was nothing to remove.
    pub fn delete(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.player_path(name)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of every stored player, sorted.
    pub fn players(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != PLAYER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
