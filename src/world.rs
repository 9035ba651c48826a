//! Opening, creating and saving worlds on disk.
//!
//! [`NbtWorld::open`] identifies the on-disk format by trying Anvil, Beta and
//! Alpha in turn. A trial that finds the wrong `Data/version` hands over to
//! the next format; any other failure (unreadable file, corrupt data, schema
//! errors) ends the search and is reported as is.
//!
//! Dimensions are opened lazily. The first request for any manager of a
//! dimension creates its storage directory, its [`ChunkCache`] and the
//! managers sharing it; later requests hand out the same instances. The
//! [`PlayerManager`] is shared the same way, one per world.

mod alpha;
mod block_manager;
mod cache;
mod chunk;
mod chunk_manager;
mod config;
mod dimension;
mod format;
mod level;
mod player;
mod region;
mod store;

use std::{
    cell::{OnceCell, RefCell},
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

pub use alpha::*;
pub use block_manager::*;
pub use cache::*;
pub use chunk::*;
pub use chunk_manager::*;
pub use config::*;
pub use dimension::*;
pub use format::*;
pub use level::*;
pub use player::*;
pub use region::*;
pub use store::*;

use crate::{
    BigEndian, Error, NamedTag, NbtErrorKind, NbtErrors, Repaired, Result, TagNode,
    read_compressed, repair, write_compressed,
};

/// Canonical name of the root metadata file.
pub const LEVEL_FILE: &str = "level.dat";
/// Subdirectory of a dimension holding its region files.
pub const REGION_DIR: &str = "region";
/// Default directory of auxiliary data such as maps, relative to the world.
pub const DATA_DIR: &str = "data";

/// A successfully opened world plus the warnings its level document raised.
pub struct Opened {
    pub world: NbtWorld,
    pub report: NbtErrors,
}

#[derive(Clone)]
struct DimensionManagers {
    cache: Rc<RefCell<ChunkCache>>,
    regions: Option<Rc<RefCell<RegionManager>>>,
    chunks: Rc<ChunkManager>,
    blocks: Rc<BlockManager>,
}

/// An open world. Confined to one thread.
pub struct NbtWorld {
    format: WorldFormat,
    root: PathBuf,
    level_file: String,
    level: Level,
    config: WorldConfig,
    data_dir: PathBuf,
    dimensions: RefCell<IndexMap<Dimension, DimensionManagers>>,
    players: OnceCell<Rc<PlayerManager>>,
}

impl NbtWorld {
    /// Opens the world at `path`, detecting its format.
    ///
    /// `path` is either the world directory or the level file itself.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Opened, NbtErrors> {
        Self::open_with(path, WorldConfig::default())
    }

    pub fn open_with(
        path: impl AsRef<Path>,
        config: WorldConfig,
    ) -> std::result::Result<Opened, NbtErrors> {
        let path = path.as_ref();
        for format in WorldFormat::ALL {
            debug!("trying {format} format for {}", path.display());
            match Self::try_open(path, format, config) {
                Ok(opened) => return Ok(opened),
                Err(errors) if errors.has_kind(NbtErrorKind::InvalidVersion) => {
                    debug!("{format} rejected {}: {errors}", path.display());
                }
                Err(errors) => return Err(errors),
            }
        }
        Err(NbtErrors::from_message(
            NbtErrorKind::IoError,
            "Unknown world file format.",
        ))
    }

    /// Opens the world at `path` as `format`, without trying any other.
    pub fn open_as(
        path: impl AsRef<Path>,
        format: WorldFormat,
    ) -> std::result::Result<Opened, NbtErrors> {
        Self::try_open(path.as_ref(), format, WorldConfig::default())
    }

    pub fn open_as_with(
        path: impl AsRef<Path>,
        format: WorldFormat,
        config: WorldConfig,
    ) -> std::result::Result<Opened, NbtErrors> {
        Self::try_open(path.as_ref(), format, config)
    }

    fn try_open(
        path: &Path,
        format: WorldFormat,
        config: WorldConfig,
    ) -> std::result::Result<Opened, NbtErrors> {
        let (root, level_file) = resolve(path)?;

        let raw = fs::read(root.join(&level_file)).map_err(|_| {
            NbtErrors::from_message(
                NbtErrorKind::IoError,
                format!("Cannot open {level_file} for reading."),
            )
        })?;
        let document = read_compressed::<BigEndian>(&raw).map_err(|e| NbtErrors::from_error(&e))?;

        if !version_matches(format, &document.value) {
            return Err(NbtErrors::from_message(
                NbtErrorKind::InvalidVersion,
                format!("This world does not use the {format} file format."),
            ));
        }

        let Repaired { tree, report } = repair(Some(document.value), &Level::schema());
        if report.has_errors() {
            return Err(report);
        }
        for warning in &report.warnings {
            warn!("{level_file}: {warning}");
        }

        if format.uses_regions() && !root.join(REGION_DIR).is_dir() {
            return Err(report.with_error(
                NbtErrorKind::IoError,
                format!("Directory {REGION_DIR} does not exist."),
            ));
        }

        let level = Level::from_tree(NamedTag::new(document.name, tree))
            .map_err(|e| NbtErrors::from_error(&e))?;
        info!("opened {format} world at {}", root.display());

        Ok(Opened {
            world: Self::assemble(format, root, level_file, level, config),
            report,
        })
    }

    /// Creates the directory layout of a new world. Nothing is written to
    /// `level.dat` until [`NbtWorld::save`].
    pub fn create(path: impl AsRef<Path>, format: WorldFormat) -> Result<Self> {
        Self::create_with(path, format, WorldConfig::default())
    }

    pub fn create_with(
        path: impl AsRef<Path>,
        format: WorldFormat,
        config: WorldConfig,
    ) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        if format.uses_regions() {
            fs::create_dir_all(root.join(REGION_DIR))?;
        }
        info!("created {format} world at {}", root.display());

        let level = Level::new(format.version());
        Ok(Self::assemble(format, root, LEVEL_FILE.to_owned(), level, config))
    }

    fn assemble(
        format: WorldFormat,
        root: PathBuf,
        level_file: String,
        level: Level,
        config: WorldConfig,
    ) -> Self {
        Self {
            format,
            root,
            level_file,
            level,
            config,
            data_dir: PathBuf::from(DATA_DIR),
            dimensions: RefCell::new(IndexMap::new()),
            players: OnceCell::new(),
        }
    }

    #[inline]
    pub fn format(&self) -> WorldFormat {
        self.format
    }

    /// The world directory.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn level_path(&self) -> PathBuf {
        self.root.join(&self.level_file)
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[inline]
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Writes `level.dat`, then every dirty chunk of every opened dimension.
    /// Returns the number of chunks written.
    pub fn save(&self) -> Result<usize> {
        let data = write_compressed::<BigEndian>(self.level.tree(), self.config.level_compression)?;
        fs::write(self.level_path(), data)?;

        let managers: Vec<Rc<ChunkManager>> = self
            .dimensions
            .borrow()
            .values()
            .map(|managers| managers.chunks.clone())
            .collect();
        let mut saved = 0;
        for chunks in managers {
            saved += chunks.save()?;
        }
        debug!("saved world at {} ({saved} chunks)", self.root.display());
        Ok(saved)
    }

    pub fn chunk_manager(&self, dimension: impl Into<Dimension>) -> Result<Rc<ChunkManager>> {
        Ok(self.dimension(dimension.into())?.chunks)
    }

    pub fn block_manager(&self, dimension: impl Into<Dimension>) -> Result<Rc<BlockManager>> {
        Ok(self.dimension(dimension.into())?.blocks)
    }

    /// Region storage of a dimension. Alpha worlds have none and return
    /// [`Error::Unsupported`].
    pub fn region_manager(
        &self,
        dimension: impl Into<Dimension>,
    ) -> Result<Rc<RefCell<RegionManager>>> {
        if !self.format.uses_regions() {
            return Err(Error::Unsupported("Alpha worlds do not use region files"));
        }
        self.dimension(dimension.into())?
            .regions
            .ok_or(Error::Unsupported("dimension has no region files"))
    }

    /// Player storage below `<world>/players`, created on first use and
    /// shared afterwards.
    pub fn player_manager(&self) -> Rc<PlayerManager> {
        self.players
            .get_or_init(|| {
                Rc::new(PlayerManager::new(
                    self.root.join(PLAYER_DIR),
                    self.config.level_compression,
                ))
            })
            .clone()
    }

    /// Directory of auxiliary data resources, rooted in the world directory.
    pub fn data_directory(&self) -> PathBuf {
        self.root.join(&self.data_dir)
    }

    /// Moves the data directory. Relative paths are resolved against the
    /// world directory.
    pub fn set_data_directory(&mut self, dir: impl Into<PathBuf>) {
        self.data_dir = dir.into();
    }

    /// The cache of an already opened dimension. Never opens one.
    pub fn chunk_cache(&self, dimension: impl Into<Dimension>) -> Option<Rc<RefCell<ChunkCache>>> {
        let dimension = dimension.into().canonical();
        self.dimensions
            .borrow()
            .get(&dimension)
            .map(|managers| managers.cache.clone())
    }

    /// Dimensions opened so far, in the order they were opened.
    pub fn opened_dimensions(&self) -> Vec<Dimension> {
        self.dimensions.borrow().keys().cloned().collect()
    }

    /// Storage directory of a dimension's chunks.
    pub fn dimension_path(&self, dimension: &Dimension) -> PathBuf {
        let base = dimension.directory(&self.root);
        if self.format.uses_regions() {
            base.join(REGION_DIR)
        } else {
            base
        }
    }

    fn dimension(&self, dimension: Dimension) -> Result<DimensionManagers> {
        let dimension = dimension.canonical();
        if !dimension.is_valid() {
            return Err(Error::IO(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid dimension name \"{dimension}\""),
            )));
        }
        if let Some(managers) = self.dimensions.borrow().get(&dimension) {
            return Ok(managers.clone());
        }

        let dir = self.dimension_path(&dimension);
        fs::create_dir_all(&dir)?;

        let cache = Rc::new(RefCell::new(ChunkCache::new(self.config.preferred_cache_size)));
        let mut regions = None;
        let store: Rc<RefCell<dyn ChunkStore>> = match self.format.region_extension() {
            Some(extension) => {
                let manager = Rc::new(RefCell::new(RegionManager::new(
                    &dir,
                    extension,
                    self.config.chunk_compression,
                )));
                regions = Some(manager.clone());
                manager
            }
            None => Rc::new(RefCell::new(AlphaChunkStore::new(&dir))),
        };
        let chunks = Rc::new(ChunkManager::new(store, cache.clone(), self.format.chunk_layout()));
        let blocks = Rc::new(BlockManager::new(chunks.clone()));

        let managers = DimensionManagers {
            cache,
            regions,
            chunks,
            blocks,
        };
        debug!("opened dimension {dimension:?} at {}", dir.display());
        self.dimensions
            .borrow_mut()
            .insert(dimension, managers.clone());
        Ok(managers)
    }
}

/// Splits `path` into the world directory and the level file name.
fn resolve(path: &Path) -> std::result::Result<(PathBuf, String), NbtErrors> {
    if path.is_dir() {
        if !path.join(LEVEL_FILE).is_file() {
            return Err(NbtErrors::from_message(
                NbtErrorKind::IoError,
                format!("Data file \"{LEVEL_FILE}\" not found in \"{}\"", path.display()),
            ));
        }
        return Ok((path.to_path_buf(), LEVEL_FILE.to_owned()));
    }

    if path.is_file() {
        let level_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| LEVEL_FILE.to_owned());
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        return Ok((root.to_path_buf(), level_file));
    }

    Err(NbtErrors::from_message(
        NbtErrorKind::IoError,
        format!("Directory \"{}\" not found", path.display()),
    ))
}

/// Anvil and Beta need their exact version; Alpha needs no version at all.
fn version_matches(format: WorldFormat, root: &TagNode) -> bool {
    match Level::version_field(root) {
        None => format.version().is_none(),
        Some(field) => format.version().is_some() && field.as_int() == format.version(),
    }
}
