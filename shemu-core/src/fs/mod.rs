//! Virtual filesystem.
//!
//! - `Node`: directory/file tree with insertion-ordered children
//! - `resolve`: textual path resolution against a cwd
//! - `Vfs`: tree plus cwd, with listing, `cd` and XML load/save

mod node;
mod path;
mod vfs;

pub use node::{is_valid_name, Children, Node};
pub use path::{join, resolve, ROOT_ALIAS};
pub use vfs::{DirEntry, EntryKind, Vfs};
