//! `[pdf]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pdf]
//! input = "keymap.svg"          # Source SVG
//! output = "keymap.pdf"         # Merged PDF
//! layers_per_page = 2
//! exclude = ["COLEMAK"]         # Layer names left out entirely
//! page_width = 612.0            # Points (US Letter)
//! page_height = 792.0
//! renderer = "rsvg-convert"
//! timeout_secs = 60             # Per page
//! jobs = 1                      # Render worker threads
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;
use crate::render::{LETTER_HEIGHT_PT, LETTER_WIDTH_PT};

/// PDF conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub layers_per_page: usize,
    pub exclude: Vec<String>,

    /// Overrides the declared canvas height when sizing the last layer.
    pub height: Option<f64>,

    pub page_width: f64,
    pub page_height: f64,

    /// Renderer executable, invoked as `<renderer> -f pdf -w W -h H -o FILE`.
    pub renderer: String,
    pub timeout_secs: u64,
    pub jobs: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            input: "keymap.svg".into(),
            output: "keymap.pdf".into(),
            layers_per_page: 2,
            exclude: Vec::new(),
            height: None,
            page_width: LETTER_WIDTH_PT,
            page_height: LETTER_HEIGHT_PT,
            renderer: "rsvg-convert".into(),
            timeout_secs: 60,
            jobs: 1,
        }
    }
}

impl PdfConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.layers_per_page == 0 {
            diag.error("pdf.layers_per_page", "must be at least 1");
        }
        if !(self.page_width > 0.0) {
            diag.error("pdf.page_width", "must be positive");
        }
        if !(self.page_height > 0.0) {
            diag.error("pdf.page_height", "must be positive");
        }
        if let Some(height) = self.height
            && !(height > 0.0)
        {
            diag.error("pdf.height", "must be positive");
        }
        if self.renderer.trim().is_empty() {
            diag.error("pdf.renderer", "must name an executable");
        }
        if self.timeout_secs == 0 {
            diag.error("pdf.timeout_secs", "must be at least 1");
        }
        if self.jobs == 0 {
            diag.error("pdf.jobs", "must be at least 1");
        }
    }
}
