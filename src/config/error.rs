//! Configuration error types.

use owo_colors::{OwoColorize, Stream, Style};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    // No #[from]: the diagnostics print themselves in full
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One invalid field.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    /// Dotted field path, e.g. `pdf.layers_per_page`
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}{}{}",
            styled("[", Style::new().dimmed()),
            styled(&self.field, Style::new().cyan()),
            styled("]", Style::new().dimmed())
        )?;
        write!(f, "{} {}", styled("→", Style::new().red()), self.message)
    }
}

/// Validation errors collected across all sections.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigDiagnostic {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    /// Err if any error was collected.
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Diagnostics(self))
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}\n",
            styled("config validation failed:", Style::new().red().bold())
        )?;
        for (i, err) in self.errors.iter().enumerate() {
            write!(f, "{err}")?;
            if i + 1 < self.errors.len() {
                writeln!(f, "\n")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

/// Diagnostics end up on stderr through the error chain.
fn styled(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |text| text.style(style))
        .to_string()
}
