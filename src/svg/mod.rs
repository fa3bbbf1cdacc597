//! Keymap SVG layer discovery and re-pagination.
//!
//! # Pipeline
//!
//! ```text
//! source SVG
//!     │
//!     ▼
//! ┌────────┐
//! │ layer  │ ──► layers with offsets and inferred heights
//! └───┬────┘
//!     ▼
//! ┌────────┐
//! │ filter │ ──► excluded names removed
//! └───┬────┘
//!     ▼
//! ┌──────────┐
//! │ paginate │ ──► contiguous chunks of N layers
//! └───┬──────┘
//!     ▼
//! ┌────────┐
//! │ page   │ ──► one standalone, cropped SVG per chunk
//! └────────┘
//! ```

mod error;
mod filter;
mod layer;
mod page;
mod paginate;
mod tree;

pub use error::SvgError;
pub use filter::exclude_layers;
pub use layer::{Canvas, Layer, extract_layers, non_monotonic};
pub use page::{PageDocument, build_page, number};
pub use paginate::{PageSize, paginate};
pub use tree::Document;

use std::path::Path;

use anyhow::{Context, Result};

/// Read and parse an SVG file.
pub fn load(path: &Path) -> Result<Document> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Document::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Everything the page builder needs from one source document.
#[derive(Debug, Clone)]
pub struct Keymap {
    pub doc: Document,
    pub canvas: Canvas,
    /// All discovered layers, before exclusion.
    pub layers: Vec<Layer>,
}

impl Keymap {
    /// Discover layers. `total_height` overrides the declared canvas height.
    pub fn new(doc: Document, total_height: Option<f64>) -> Result<Self, SvgError> {
        let canvas = Canvas::from_root(&doc.root)?;
        let layers = extract_layers(&doc, total_height.unwrap_or(canvas.height));
        Ok(Self {
            doc,
            canvas,
            layers,
        })
    }

    /// Exclude, paginate and build every page in order.
    pub fn pages<S: AsRef<str>>(
        &self,
        excluded: &[S],
        size: PageSize,
    ) -> Result<Vec<PageDocument>, SvgError> {
        let layers = exclude_layers(self.layers.clone(), excluded);
        paginate(&layers, size)
            .into_iter()
            .map(|chunk| build_page(&self.doc, self.canvas.width, chunk))
            .collect()
    }
}
