//! XML image format for the virtual filesystem.
//!
//! ```xml
//! <vfs>
//!   <dir name="root">
//!     <dir name="sub"/>
//!     <file name="f.txt">BASE64_OF_UTF8_BYTES</file>
//!   </dir>
//! </vfs>
//! ```
//!
//! The top-level `dir` is always the filesystem root; its `name` attribute is
//! ignored on load and written back as `root`.

use std::io::Write;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::fs::{Children, Node};

const VFS_TAG: &str = "vfs";
const DIR_TAG: &str = "dir";
const FILE_TAG: &str = "file";
const NAME_ATTR: &str = "name";
/// Name written for the top-level directory.
pub const ROOT_NAME: &str = "root";
/// Deepest element nesting accepted on load, `<vfs>` included.
pub const MAX_DEPTH: usize = 512;

/// Parse an XML image into a directory tree.
pub fn deserialize(xml: &str) -> VfsResult<Node> {
    let doc = parse_document(xml)?;
    if doc.name != VFS_TAG {
        return Err(VfsError::Format(format!(
            "root element must be <{VFS_TAG}>, found <{}>",
            doc.name
        )));
    }

    let mut dirs = doc.children.iter().filter(|el| el.name == DIR_TAG);
    let root = dirs
        .next()
        .ok_or_else(|| VfsError::Format(format!("<{VFS_TAG}> has no <{DIR_TAG}> element")))?;
    if dirs.next().is_some() {
        return Err(VfsError::Format(format!(
            "<{VFS_TAG}> must contain exactly one top-level <{DIR_TAG}>"
        )));
    }

    build_dir(root)
}

/// Render a directory tree as an XML image.
pub fn serialize(root: &Node) -> VfsResult<String> {
    let Node::Directory(children) = root else {
        return Err(VfsError::Format("image root must be a directory".into()));
    };

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(VFS_TAG)))?;
    write_dir(&mut writer, ROOT_NAME, children)?;
    writer.write_event(Event::End(BytesEnd::new(VFS_TAG)))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| VfsError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Read and parse an image file.
pub fn read_image(path: &Path) -> VfsResult<Node> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VfsError::FileNotFound(path.display().to_string()),
        _ => VfsError::Io(e),
    })?;
    let xml = std::str::from_utf8(&bytes).map_err(parse_error)?;
    let root = deserialize(xml)?;
    debug!(path = %path.display(), "read VFS image");
    Ok(root)
}

/// Serialize a tree and write it to `path`.
pub fn write_image(path: &Path, root: &Node) -> VfsResult<()> {
    let xml = serialize(root)?;
    std::fs::write(path, xml)?;
    debug!(path = %path.display(), "wrote VFS image");
    Ok(())
}

fn write_dir<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    children: &Children,
) -> std::io::Result<()> {
    let start = BytesStart::new(DIR_TAG).with_attributes([(NAME_ATTR, name)]);
    if children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for (child_name, child) in children {
        match child {
            Node::Directory(grandchildren) => write_dir(writer, child_name, grandchildren)?,
            Node::File(content) => {
                let start =
                    BytesStart::new(FILE_TAG).with_attributes([(NAME_ATTR, child_name.as_str())]);
                if content.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    let encoded = STANDARD.encode(content);
                    writer.write_event(Event::Start(start))?;
                    writer.write_event(Event::Text(BytesText::new(&encoded)))?;
                    writer.write_event(Event::End(BytesEnd::new(FILE_TAG)))?;
                }
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(DIR_TAG)))
}

fn build_dir(el: &Element) -> VfsResult<Node> {
    let mut dir = Node::dir();
    for child in &el.children {
        let node = match child.name.as_str() {
            DIR_TAG => build_dir(child)?,
            FILE_TAG => Node::File(decode_content(child)?),
            other => {
                debug!(tag = other, "skipping unknown element");
                continue;
            }
        };
        let name = child.attr(NAME_ATTR).ok_or_else(|| {
            VfsError::Format(format!("<{}> without a {NAME_ATTR} attribute", child.name))
        })?;
        dir.insert(name, node)
            .ok_or_else(|| VfsError::Format(format!("invalid entry name '{name}'")))?;
    }
    Ok(dir)
}

/// Decode base64 file text. Bytes that are not valid UTF-8 are dropped.
fn decode_content(el: &Element) -> VfsResult<String> {
    let compact: String = el.text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| {
        let name = el.attr(NAME_ATTR).unwrap_or_default();
        VfsError::Format(format!("file '{name}' has invalid base64 content: {e}"))
    })?;
    Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect())
}

/// Minimal element tree built from the XML event stream.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart) -> VfsResult<Self> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(parse_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(parse_error)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_document(xml: &str) -> VfsResult<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(start) => {
                if open.len() >= MAX_DEPTH {
                    return Err(VfsError::Format(format!(
                        "elements nested deeper than {MAX_DEPTH} levels"
                    )));
                }
                open.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => attach(&mut open, &mut root, Element::from_start(&start)?)?,
            Event::End(_) => {
                // Unbalanced end tags are rejected by the reader itself.
                let el = open
                    .pop()
                    .ok_or_else(|| VfsError::Parse("unexpected closing tag".into()))?;
                attach(&mut open, &mut root, el)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(parse_error)?;
                open.last_mut()
                    .ok_or_else(|| VfsError::Parse("text outside of the root element".into()))?
                    .text
                    .push_str(&text);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                open.last_mut()
                    .ok_or_else(|| VfsError::Parse("CDATA outside of the root element".into()))?
                    .text
                    .push_str(&String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(el) = open.last() {
        return Err(VfsError::Parse(format!("unclosed element <{}>", el.name)));
    }
    root.ok_or_else(|| VfsError::Parse("document has no root element".into()))
}

fn attach(open: &mut [Element], root: &mut Option<Element>, el: Element) -> VfsResult<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => return Err(VfsError::Parse("multiple root elements".into())),
    }
    Ok(())
}

fn parse_error(e: impl std::fmt::Display) -> VfsError {
    VfsError::Parse(e.to_string())
}
