//! VFS engine: the tree plus the current working directory.

use std::path::Path;

use tracing::debug;

use super::node::Node;
use super::path::{join, resolve};
use crate::codec;
use crate::error::{VfsError, VfsResult};

/// What a directory listing reports for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory and its number of direct children.
    Directory { items: usize },
    /// A file and its content length in bytes.
    File { bytes: usize },
}

/// One line of a detailed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// In-memory filesystem session.
///
/// `cwd` always names an existing directory: it only changes through
/// `change_dir` (after validation), `reset_cwd` and a successful load.
#[derive(Debug, Default, Clone)]
pub struct Vfs {
    root: Node,
    cwd: Vec<String>,
}

impl Vfs {
    /// Create an empty filesystem positioned at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem over an existing tree.
    ///
    /// A file passed as `root` is replaced with an empty directory.
    pub fn from_root(root: Node) -> Self {
        let root = if root.is_dir() { root } else { Node::dir() };
        Self {
            root,
            cwd: Vec::new(),
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Current directory as components from the root.
    pub fn cwd(&self) -> &[String] {
        &self.cwd
    }

    /// Current directory as an absolute path string.
    pub fn pwd(&self) -> String {
        join(&self.cwd)
    }

    /// Node at an absolute component path.
    pub fn lookup<S: AsRef<str>>(&self, components: &[S]) -> Option<&Node> {
        self.root.lookup(components)
    }

    /// Names of the children of the directory at `path` (`None` for cwd).
    ///
    /// A missing target or a file yields an empty listing, not an error.
    pub fn list_dir(&self, path: Option<&str>) -> Vec<String> {
        self.target_dir(path)
            .and_then(Node::children)
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Like [`Vfs::list_dir`] with child counts and file sizes.
    pub fn list_dir_details(&self, path: Option<&str>) -> Vec<DirEntry> {
        let Some(children) = self.target_dir(path).and_then(Node::children) else {
            return Vec::new();
        };
        children
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                kind: match node {
                    Node::Directory(items) => EntryKind::Directory { items: items.len() },
                    Node::File(content) => EntryKind::File {
                        bytes: content.len(),
                    },
                },
            })
            .collect()
    }

    /// Move the cwd to `path` if it resolves to an existing directory.
    ///
    /// On failure the cwd is left untouched and the error carries `path`
    /// as given.
    pub fn change_dir(&mut self, path: &str) -> VfsResult<()> {
        let target = resolve(Some(path), &self.cwd);
        match self.root.lookup(&target) {
            Some(node) if node.is_dir() => {
                self.cwd = target;
                debug!(cwd = %self.pwd(), "changed directory");
                Ok(())
            }
            _ => Err(VfsError::DirectoryNotFound(path.to_string())),
        }
    }

    /// Move the cwd back to the root.
    pub fn reset_cwd(&mut self) {
        self.cwd.clear();
    }

    /// Write the whole tree (regardless of cwd) as an XML image.
    pub fn save_to_xml(&self, path: impl AsRef<Path>) -> VfsResult<()> {
        codec::write_image(path.as_ref(), &self.root)
    }

    /// Replace the tree with the image at `path` and return to the root.
    ///
    /// Nothing changes unless the whole image was read and parsed.
    pub fn load_from_xml(&mut self, path: impl AsRef<Path>) -> VfsResult<()> {
        let root = codec::read_image(path.as_ref())?;
        self.root = root;
        self.cwd.clear();
        Ok(())
    }

    fn target_dir(&self, path: Option<&str>) -> Option<&Node> {
        self.root.lookup(&resolve(path, &self.cwd))
    }
}
