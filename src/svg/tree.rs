//! Owned, mutable XML tree for SVG documents.
//!
//! The document is parsed once with `quick-xml` into plain owned nodes so that
//! per-page copies can be produced with `Clone` and edited without touching a
//! live parser tree. Attribute order, qualified names and namespace
//! declarations are kept verbatim; the XML declaration and DOCTYPE are dropped.

use quick_xml::{
    Reader, Writer,
    escape::unescape,
    events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event},
};

use super::error::SvgError;

type Result<T> = std::result::Result<T, SvgError>;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written in the source (`g`, `svg:g`, ...).
    pub name: String,
    /// Unescaped `(qualified name, value)` pairs.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Overwrite an attribute in place, or append it when absent.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    /// Direct element children, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    fn from_start(start: &BytesStart<'_>, position: u64) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| SvgError::Xml {
                position,
                source: err.into(),
            })?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_owned();
            let raw = std::str::from_utf8(&attr.value)?;
            attrs.push((key, unescape_lossy(raw)));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_owned()));
        }
    }
}

/// A parsed document: a single root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Parse a complete XML document.
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|source| SvgError::Xml {
                position: reader.buffer_position() as u64,
                source,
            })?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(start) => stack.push(Element::from_start(&start, position)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start, position)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let found = std::str::from_utf8(end.name().as_ref())?.to_owned();
                    let Some(element) = stack.pop() else {
                        return Err(SvgError::MismatchedEnd {
                            expected: String::new(),
                            found,
                        });
                    };
                    if element.name != found {
                        return Err(SvgError::MismatchedEnd {
                            expected: element.name,
                            found,
                        });
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&unescape_lossy(std::str::from_utf8(&text)?));
                    }
                }
                Event::GeneralRef(reference) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = format!("&{};", std::str::from_utf8(&reference)?);
                        parent.push_text(&unescape_lossy(&raw));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let data = std::str::from_utf8(&data)?.to_owned();
                        parent.children.push(Node::CData(data));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let comment = std::str::from_utf8(&comment)?.to_owned();
                        parent.children.push(Node::Comment(comment));
                    }
                }
                Event::PI(pi) => {
                    if let Some(parent) = stack.last_mut() {
                        let pi = std::str::from_utf8(&pi)?.to_owned();
                        parent.children.push(Node::ProcessingInstruction(pi));
                    }
                }
                Event::Eof => break,
                // Declaration and DOCTYPE are not carried over.
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(SvgError::Unclosed(open.name));
        }
        root.map(|root| Self { root }).ok_or(SvgError::NoRoot)
    }

    /// Serialize to UTF-8 bytes without an XML declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }

    /// Serialize to a string.
    pub fn serialize(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        Ok(String::from_utf8(bytes).map_err(|e| e.utf8_error())?)
    }
}

/// Hand a finished element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(SvgError::TrailingContent);
    }
    *root = Some(element);
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data)))?,
            Node::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment)))?
            }
            Node::ProcessingInstruction(pi) => writer.write_event(Event::PI(BytesPI::new(pi)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Unescape entity references, keeping the raw text if it holds an unknown entity.
fn unescape_lossy(raw: &str) -> String {
    unescape(raw).map_or_else(|_| raw.to_owned(), |text| text.into_owned())
}
