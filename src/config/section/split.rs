//! `[split]` section configuration.
//!
//! Defaults reproduce the fixed grouping: three layers per file, COLEMAK left
//! out, files named `keymap_page1.svg`, `keymap_page2.svg`, ...

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;

/// Per-page SVG output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub input: PathBuf,
    pub prefix: String,
    pub layers_per_page: usize,
    pub exclude: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: "keymap.svg".into(),
            prefix: "keymap_page".into(),
            layers_per_page: 3,
            exclude: vec!["COLEMAK".into()],
        }
    }
}

impl SplitConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.layers_per_page == 0 {
            diag.error("split.layers_per_page", "must be at least 1");
        }
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            diag.error("split.prefix", "must be a plain file name prefix");
        }
    }
}
