//! Error types for the shell emulator.

use thiserror::Error;

/// Errors raised by the VFS engine, the XML codec and the interpreter.
#[derive(Error, Debug)]
pub enum VfsError {
    /// The VFS image is not well-formed XML.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Well-formed XML that does not follow the `<vfs><dir>` schema.
    #[error("invalid VFS format: {0}")]
    Format(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Carries the path exactly as the user typed it.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command execution failed: {0}")]
    CommandExecution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;
