//! Shell Emulator Core
//!
//! This crate provides the core of a teaching-oriented shell emulator:
//! - An in-memory virtual filesystem (VFS) with path resolution
//! - XML + base64 images of the VFS tree
//! - A command interpreter (`ls`, `cd`, `vfs-save`, `history`, `uptime`, `exit`)
//!
//! # Architecture
//!
//! The emulator uses a layered design:
//! - `Node`: Directory/file tree
//! - `resolve`: Textual path resolution against a cwd
//! - `codec`: XML image serialization
//! - `Vfs`: Tree plus current directory
//! - `Shell`: Tokenizes lines and dispatches commands within a `Session`
//! - `ShellConsole` trait: Line output abstraction

pub mod codec;
pub mod console;
pub mod error;
pub mod fs;
pub mod script;
pub mod session;
pub mod shell;

pub use codec::{deserialize, serialize};
pub use console::{HeadlessConsole, ShellConsole};
pub use error::{VfsError, VfsResult};
pub use fs::{resolve, DirEntry, EntryKind, Node, Vfs};
pub use script::script_commands;
pub use session::{format_uptime, Session, ShellConfig};
pub use shell::{tokenize, Outcome, Shell, Status};
