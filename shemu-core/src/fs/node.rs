//! Directory/file tree model.

use indexmap::IndexMap;

/// Children of a directory, kept in insertion order.
pub type Children = IndexMap<String, Node>;

/// A node of the virtual filesystem tree.
///
/// Every directory exclusively owns its children, so the tree can never
/// contain cycles or shared nodes. The root is an unnamed `Directory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Directory(Children),
    /// UTF-8 text content, possibly empty.
    File(String),
}

impl Default for Node {
    fn default() -> Self {
        Self::dir()
    }
}

impl Node {
    /// Create an empty directory.
    pub fn dir() -> Self {
        Node::Directory(Children::new())
    }

    /// Create a file with the given content.
    pub fn file(content: impl Into<String>) -> Self {
        Node::File(content.into())
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// Children of a directory. `None` for files.
    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Directory(children) => Some(children),
            Node::File(_) => None,
        }
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children()?.get(name)
    }

    /// File content. `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File(content) => Some(content),
            Node::Directory(_) => None,
        }
    }

    /// Size of a file in bytes of its UTF-8 encoding.
    pub fn size(&self) -> Option<usize> {
        self.content().map(str::len)
    }

    /// Number of direct children of a directory.
    pub fn child_count(&self) -> Option<usize> {
        self.children().map(IndexMap::len)
    }

    /// Insert `node` under `name`, returning a handle to the stored child.
    ///
    /// Returns `None` when `self` is a file or `name` is not a valid node
    /// name. Re-inserting an existing name replaces the child in place and
    /// keeps its listing position.
    pub fn insert(&mut self, name: &str, node: Node) -> Option<&mut Node> {
        if !is_valid_name(name) {
            return None;
        }
        match self {
            Node::Directory(children) => {
                let (idx, _) = children.insert_full(name.to_string(), node);
                children.get_index_mut(idx).map(|(_, child)| child)
            }
            Node::File(_) => None,
        }
    }

    /// Add an empty subdirectory (convenience method).
    pub fn add_dir(&mut self, name: &str) -> Option<&mut Node> {
        self.insert(name, Node::dir())
    }

    /// Add a file with string content (convenience method).
    pub fn add_file(&mut self, name: &str, content: impl Into<String>) -> Option<&mut Node> {
        self.insert(name, Node::file(content))
    }

    /// Walk a component path from this node.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, component| node.child(component.as_ref()))
    }
}

/// Node names are non-empty and contain no path separator.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\'])
}
