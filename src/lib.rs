pub use zerocopy::BigEndian;
pub use zerocopy::LittleEndian;
pub use zerocopy::NativeEndian;

pub mod compression;
pub mod diagnostics;
pub mod error;
pub mod nbt;
pub mod read;
pub mod schema;
mod util;
pub mod value;
pub mod verify;
pub mod world;
pub mod write;

pub use compression::*;
pub use diagnostics::*;
pub use error::*;
pub use nbt::*;
pub use read::*;
pub use schema::*;
pub use util::*;
pub use value::*;
pub use verify::*;
pub use world::*;
pub use write::*;
