mod compound;
mod list;
mod node;

pub use compound::*;
pub use list::*;
pub use node::*;
