//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! keymap = "config/toucan.keymap"   # ZMK keymap source
//! drawer_config = "config.yaml"     # keymap-drawer settings
//! intermediate = "keymap.yaml"      # output of the parse step
//! output = "keymap.svg"             # output of the draw step
//! program = "keymap"
//! debounce_ms = 500
//! timeout_secs = 120
//!
//! [[watch.rewrite]]
//! from = "layout: {zmk_keyboard: toucan}"
//! to = "layout:\n  qmk_keyboard: crkbd/rev1\n  layout_name: LAYOUT_split_3x6_3"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::super::error::ConfigDiagnostics;

/// A literal text replacement applied to the parsed keymap before drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

/// Watch-mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub keymap: PathBuf,
    pub drawer_config: PathBuf,
    pub intermediate: PathBuf,
    pub output: PathBuf,
    pub program: String,
    pub debounce_ms: u64,
    pub timeout_secs: u64,
    pub rewrite: Vec<Rewrite>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            keymap: "config/toucan.keymap".into(),
            drawer_config: "config.yaml".into(),
            intermediate: "keymap.yaml".into(),
            output: "keymap.svg".into(),
            program: "keymap".into(),
            debounce_ms: 500,
            timeout_secs: 120,
            rewrite: vec![Rewrite {
                from: "layout: {zmk_keyboard: toucan}".into(),
                to: "layout:\n  qmk_keyboard: crkbd/rev1\n  layout_name: LAYOUT_split_3x6_3".into(),
            }],
        }
    }
}

impl WatchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.program.trim().is_empty() {
            diag.error("watch.program", "must name an executable");
        }
        if self.timeout_secs == 0 {
            diag.error("watch.timeout_secs", "must be at least 1");
        }
        for (i, rewrite) in self.rewrite.iter().enumerate() {
            if rewrite.from.is_empty() {
                diag.error(format!("watch.rewrite[{i}].from"), "must not be empty");
            }
        }
    }
}
