//! Per-page document construction.
//!
//! A page keeps every non-layer child of the root (styles, defs, fonts) plus
//! the layer groups of its chunk, and crops the canvas to the chunk's vertical
//! extent by rewriting the root's `viewBox`, `width` and `height`. The kept
//! groups retain their absolute transforms; the viewBox selects what is shown.

use std::fmt;

use rustc_hash::FxHashSet;

use super::error::SvgError;
use super::layer::{Layer, layer_name};
use super::tree::{Document, Element, Node};

/// A `viewBox` rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Rectangle spanning a chunk from its first layer's offset to its last
    /// layer's bottom edge.
    pub fn for_chunk(chunk: &[Layer], width: f64) -> Option<Self> {
        let first = chunk.first()?;
        let last = chunk.last()?;
        Some(Self {
            x: 0.0,
            y: first.y_offset,
            width,
            height: last.y_end() - first.y_offset,
        })
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            number(self.x),
            number(self.y),
            number(self.width),
            number(self.height)
        )
    }
}

/// A standalone page ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub doc: Document,
    pub viewbox: ViewBox,
    /// Names of the layers on this page, in order.
    pub layers: Vec<String>,
}

impl PageDocument {
    /// Declared `(width, height)` of the page.
    pub fn size(&self) -> (f64, f64) {
        (self.viewbox.width, self.viewbox.height)
    }
}

/// Build the page document for one chunk.
///
/// `source` is never modified: the page root is a fresh element holding
/// clones of the surviving children, so pages are independent of each other.
pub fn build_page(source: &Document, width: f64, chunk: &[Layer]) -> Result<PageDocument, SvgError> {
    let viewbox = ViewBox::for_chunk(chunk, width).ok_or(SvgError::EmptyPage)?;
    let kept: FxHashSet<&str> = chunk.iter().map(|layer| layer.name.as_str()).collect();

    let root = &source.root;
    let children = root
        .children
        .iter()
        .filter(|node| match node {
            Node::Element(element) => layer_name(element).is_none_or(|name| kept.contains(name)),
            _ => true,
        })
        .cloned()
        .collect();

    let mut page_root = Element {
        name: root.name.clone(),
        attrs: root.attrs.clone(),
        children,
    };
    page_root.set_attr("viewBox", viewbox.to_string());
    page_root.set_attr("width", number(viewbox.width));
    page_root.set_attr("height", number(viewbox.height));

    Ok(PageDocument {
        doc: Document { root: page_root },
        viewbox,
        layers: chunk.iter().map(|layer| layer.name.clone()).collect(),
    })
}

/// Shortest decimal form: `120` rather than `120.0`.
pub fn number(value: f64) -> String {
    // -0 would otherwise print as "-0"
    if value == 0.0 {
        return "0".into();
    }
    value.to_string()
}
