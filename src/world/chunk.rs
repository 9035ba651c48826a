use crate::{
    Compound, CompoundSchema, Error, List, NamedTag, NbtErrors, Result, SchemaNode, TagID,
    TagNode, verify,
};

/// Blocks along each horizontal edge of a chunk.
pub const CHUNK_WIDTH: i32 = 16;
/// Blocks along each edge of a section in sectioned chunks.
pub const SECTION_HEIGHT: i32 = 16;

const SECTION_VOLUME: usize = (CHUNK_WIDTH * CHUNK_WIDTH * SECTION_HEIGHT) as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk holding the block at world coordinates `(x, z)`.
    #[inline]
    pub const fn containing_block(x: i32, z: i32) -> Self {
        Self::new(x.div_euclid(CHUNK_WIDTH), z.div_euclid(CHUNK_WIDTH))
    }
}

/// How block data is laid out inside a chunk's `Level` compound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkLayout {
    /// One flat `Blocks` array of 16×128×16, indexed `y + z*128 + x*2048`.
    Legacy,
    /// A `Sections` list of 16³ cubes, each indexed `y<<8 | z<<4 | x`.
    Sectioned,
}

impl ChunkLayout {
    pub const fn height(self) -> i32 {
        match self {
            ChunkLayout::Legacy => 128,
            ChunkLayout::Sectioned => 256,
        }
    }

    const fn volume(self) -> usize {
        (CHUNK_WIDTH * CHUNK_WIDTH * self.height()) as usize
    }

    /// Schema of a whole chunk document in this layout.
    pub fn schema(self) -> SchemaNode {
        let common = CompoundSchema::new()
            .with(SchemaNode::int("xPos"))
            .with(SchemaNode::int("zPos"))
            .with(SchemaNode::long("LastUpdate").create_on_missing())
            .with(SchemaNode::list("Entities", TagID::Compound).create_on_missing())
            .with(SchemaNode::list("TileEntities", TagID::Compound).create_on_missing())
            .with(SchemaNode::list("TileTicks", TagID::Compound).optional())
            .with(SchemaNode::byte("TerrainPopulated").create_on_missing());

        let blocks = self.volume();
        let level = match self {
            ChunkLayout::Legacy => common.merge_into(
                &CompoundSchema::new()
                    .with(SchemaNode::byte_array("Blocks").with_length(blocks))
                    .with(SchemaNode::byte_array("Data").with_length(blocks / 2).create_on_missing())
                    .with(SchemaNode::byte_array("SkyLight").with_length(blocks / 2).create_on_missing())
                    .with(SchemaNode::byte_array("BlockLight").with_length(blocks / 2).create_on_missing())
                    .with(SchemaNode::byte_array("HeightMap").with_length(256).create_on_missing()),
            ),
            ChunkLayout::Sectioned => common.merge_into(
                &CompoundSchema::new()
                    .with(
                        SchemaNode::list("Sections", TagID::Compound)
                            .with_item_schema(section_schema())
                            .create_on_missing(),
                    )
                    .with(SchemaNode::byte_array("Biomes").with_length(256).optional())
                    .with(SchemaNode::int_array("HeightMap").with_length(256).create_on_missing())
                    .with(SchemaNode::byte("LightPopulated").optional())
                    .with(SchemaNode::long("InhabitedTime").optional()),
            ),
        };

        SchemaNode::compound(
            "",
            CompoundSchema::new()
                .with(SchemaNode::compound("Level", level))
                .with(SchemaNode::int("DataVersion").optional()),
        )
    }
}

fn section_schema() -> SchemaNode {
    let nibbles = SECTION_VOLUME / 2;
    SchemaNode::compound(
        "",
        CompoundSchema::new()
            .with(SchemaNode::byte("Y"))
            .with(SchemaNode::byte_array("Blocks").with_length(SECTION_VOLUME))
            .with(SchemaNode::byte_array("Add").with_length(nibbles).optional())
            .with(SchemaNode::byte_array("Data").with_length(nibbles))
            .with(SchemaNode::byte_array("SkyLight").with_length(nibbles))
            .with(SchemaNode::byte_array("BlockLight").with_length(nibbles)),
    )
}

/// One verified chunk document.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pos: ChunkPos,
    layout: ChunkLayout,
    tree: NamedTag,
}

impl Chunk {
    /// An empty chunk: air everywhere, no entities.
    pub fn new(pos: ChunkPos, layout: ChunkLayout) -> Self {
        let mut chunk = Self {
            pos,
            layout,
            tree: NamedTag::new("", layout.schema().build_default_tree()),
        };
        let level = chunk.level_mut();
        level.insert("xPos", pos.x);
        level.insert("zPos", pos.z);
        chunk
    }

    /// Verifies `tree` against `layout`'s schema.
    ///
    /// Structural errors reject the chunk with [`Error::Invalid`]; otherwise
    /// the chunk comes back with the warnings found.
    pub fn from_tree(pos: ChunkPos, layout: ChunkLayout, mut tree: NamedTag) -> Result<(Self, NbtErrors)> {
        let report = verify(&mut tree.value, &layout.schema());
        if report.has_errors() {
            return Err(Error::Invalid(report));
        }
        Ok((Self { pos, layout, tree }, report))
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    #[inline]
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    #[inline]
    pub fn tree(&self) -> &NamedTag {
        &self.tree
    }

    #[inline]
    pub fn into_tree(self) -> NamedTag {
        self.tree
    }

    pub fn level(&self) -> Option<&Compound> {
        self.tree.value.as_compound()?.get_ignore_case("Level")?.as_compound()
    }

    pub fn level_mut(&mut self) -> &mut Compound {
        self.tree.value.make_compound().compound_entry("Level")
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_WIDTH).contains(&z)
            && (0..self.layout.height()).contains(&y)
    }

    /// Block id at chunk-local coordinates, `None` when out of range.
    pub fn block_id(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        if !self.in_bounds(x, y, z) {
            return None;
        }
        let level = self.level()?;
        let id = match self.layout {
            ChunkLayout::Legacy => level
                .get_ignore_case("Blocks")
                .and_then(TagNode::as_byte_array)
                .and_then(|blocks| blocks.get(legacy_index(x, y, z)).copied()),
            ChunkLayout::Sectioned => level
                .get_ignore_case("Sections")
                .and_then(TagNode::as_list)
                .and_then(|sections| find_section(sections, section_y(y)))
                .and_then(|section| section.get_ignore_case("Blocks"))
                .and_then(TagNode::as_byte_array)
                .and_then(|blocks| blocks.get(section_index(x, y, z)).copied()),
        };
        // a missing section is all air
        Some(id.unwrap_or(0) as u8)
    }

    /// Sets a block at chunk-local coordinates. Returns `false` when the
    /// coordinates are out of range.
    pub fn set_block_id(&mut self, x: i32, y: i32, z: i32, id: u8) -> bool {
        if !self.in_bounds(x, y, z) {
            return false;
        }
        let volume = self.layout.volume();
        let slot = match self.layout {
            ChunkLayout::Legacy => {
                let level = self.level_mut();
                if level.get_ignore_case("Blocks").and_then(TagNode::as_byte_array).is_none() {
                    level.insert_ignore_case("Blocks", vec![0i8; volume]);
                }
                level
                    .get_ignore_case_mut("Blocks")
                    .and_then(TagNode::as_byte_array_mut)
                    .and_then(|blocks| blocks.get_mut(legacy_index(x, y, z)))
            }
            ChunkLayout::Sectioned => {
                if id == 0 && self.section_mut(section_y(y), false).is_none() {
                    return true;
                }
                self.section_mut(section_y(y), true)
                    .and_then(|section| section.get_ignore_case_mut("Blocks"))
                    .and_then(TagNode::as_byte_array_mut)
                    .and_then(|blocks| blocks.get_mut(section_index(x, y, z)))
            }
        };
        match slot {
            Some(slot) => {
                *slot = id as i8;
                true
            }
            None => false,
        }
    }

    fn section_mut(&mut self, y: i8, create: bool) -> Option<&mut Compound> {
        let level = self.level_mut();
        if !matches!(level.get_ignore_case("Sections"), Some(TagNode::List(_))) {
            level.insert_ignore_case("Sections", List::of(TagID::Compound));
        }
        let sections = level.get_ignore_case_mut("Sections").and_then(TagNode::as_list_mut)?;
        let index = match sections.iter().position(|section| section_has_y(section, y)) {
            Some(index) => index,
            None if create => {
                sections.push(new_section(y)).ok()?;
                sections.len() - 1
            }
            None => return None,
        };
        sections.get_mut(index).and_then(TagNode::as_compound_mut)
    }
}

#[inline]
const fn legacy_index(x: i32, y: i32, z: i32) -> usize {
    (y + z * 128 + x * 128 * CHUNK_WIDTH) as usize
}

#[inline]
const fn section_index(x: i32, y: i32, z: i32) -> usize {
    (((y & 15) << 8) | (z << 4) | x) as usize
}

#[inline]
const fn section_y(y: i32) -> i8 {
    (y >> 4) as i8
}

fn section_has_y(section: &TagNode, y: i8) -> bool {
    section
        .as_compound()
        .and_then(|section| section.get_ignore_case("Y"))
        .and_then(TagNode::as_byte)
        == Some(y)
}

fn find_section(sections: &List, y: i8) -> Option<&Compound> {
    sections
        .iter()
        .find(|section| section_has_y(section, y))
        .and_then(TagNode::as_compound)
}

fn new_section(y: i8) -> Compound {
    let nibbles = SECTION_VOLUME / 2;
    let mut section = Compound::with_capacity(5);
    section.insert("Y", y);
    section.insert("Blocks", vec![0i8; SECTION_VOLUME]);
    section.insert("Data", vec![0i8; nibbles]);
    section.insert("SkyLight", vec![0i8; nibbles]);
    section.insert("BlockLight", vec![0i8; nibbles]);
    section
}
