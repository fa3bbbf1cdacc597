//! Project configuration from `keysheet.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [pdf], [split], [watch]
//! ├── error.rs       # ConfigError, ConfigDiagnostics
//! ├── util.rs        # find_config_file
//! └── mod.rs         # KeysheetConfig (this file)
//! ```
//!
//! The file is optional: every field has a default, and without a file the
//! current directory is the project root. CLI flags override file values.

mod error;
mod section;
mod util;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{PdfConfig, Rewrite, SplitConfig, WatchConfig};

use util::find_config_file;

use crate::{
    cli::{Cli, Commands, PdfArgs, SplitArgs},
    log,
    utils::path::{normalize_path, resolve},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing keysheet.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysheetConfig {
    /// Absolute path to the config file, if one was found
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory: parent of the config file, else cwd
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl KeysheetConfig {
    /// Load configuration for the parsed command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(normalize_path(&path));
                config
            }
            None => Self {
                root: cwd,
                ..Self::default()
            },
        };

        config.root = normalize_path(&config.root);
        config.apply_command_options(&cli.command);
        config.validate(&cli.command)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Resolve a configured path against the project root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve(&self.root, path.as_ref())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, command: &Commands) {
        match command {
            Commands::Pdf { args } => self.apply_pdf_args(args),
            Commands::Split { args } => self.apply_split_args(args),
            Commands::Watch => {}
        }
    }

    fn apply_pdf_args(&mut self, args: &PdfArgs) {
        let pdf = &mut self.pdf;
        Self::update_option(&mut pdf.input, args.input.as_ref());
        Self::update_option(&mut pdf.output, args.output.as_ref());
        Self::update_option(&mut pdf.layers_per_page, args.layers_per_page.as_ref());
        Self::update_option(&mut pdf.timeout_secs, args.timeout.as_ref());
        Self::update_option(&mut pdf.jobs, args.jobs.as_ref());
        if args.height.is_some() {
            pdf.height = args.height;
        }
        if let Some(size) = args.page_size {
            pdf.page_width = size.width;
            pdf.page_height = size.height;
        }
        for name in args.excluded() {
            if !pdf.exclude.contains(&name) {
                pdf.exclude.push(name);
            }
        }
    }

    fn apply_split_args(&mut self, args: &SplitArgs) {
        let split = &mut self.split;
        Self::update_option(&mut split.input, args.input.as_ref());
        Self::update_option(&mut split.layers_per_page, args.layers_per_page.as_ref());
        Self::update_option(&mut split.prefix, args.prefix.as_ref());
        if !args.exclude.is_empty() {
            split.exclude = args.exclude.clone();
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the sections the command uses, collecting every error.
    pub fn validate(&self, command: &Commands) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        match command {
            Commands::Pdf { .. } => self.pdf.validate(&mut diag),
            Commands::Split { .. } => self.split.validate(&mut diag),
            Commands::Watch => self.watch.validate(&mut diag),
        }
        diag.into_result()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KeysheetConfig {
    let (parsed, ignored) = KeysheetConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
