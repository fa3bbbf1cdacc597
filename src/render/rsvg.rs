//! Renderer backed by librsvg's `rsvg-convert`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};

use super::{PageRenderer, RenderError, RenderSize};
use crate::utils::exec::Cmd;

/// Renders SVG from stdin to a single-page PDF.
#[derive(Debug, Clone)]
pub struct RsvgConvert {
    program: String,
    timeout: Duration,
}

impl RsvgConvert {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Fail fast when the executable is not installed.
    pub fn check_available(&self) -> Result<()> {
        if which::which(&self.program).is_err() {
            bail!(
                "`{}` not found.\n  hint: install librsvg (`brew install librsvg` or `apt install librsvg2-bin`)",
                self.program
            );
        }
        Ok(())
    }

    fn command(&self, size: RenderSize, output: &Path) -> Cmd {
        Cmd::new(&self.program)
            .args(["-f", "pdf"])
            .args(["-w", &size.width.to_string()])
            .args(["-h", &size.height.to_string()])
            .arg("-o")
            .arg(output)
            .timeout(self.timeout)
    }
}

impl PageRenderer for RsvgConvert {
    fn name(&self) -> &str {
        &self.program
    }

    fn render(&self, svg: &[u8], size: RenderSize, output: &Path) -> Result<(), RenderError> {
        self.command(size, output).stdin(svg).run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let renderer = RsvgConvert::new("rsvg-convert", Duration::from_secs(60));
        let cmd = renderer.command(
            RenderSize {
                width: 612,
                height: 165,
            },
            Path::new("/tmp/page_1.pdf"),
        );
        assert_eq!(
            cmd.command_line(),
            "rsvg-convert -f pdf -w 612 -h 165 -o /tmp/page_1.pdf"
        );
    }

    #[test]
    fn test_missing_program_reported() {
        let renderer = RsvgConvert::new("no-such-rsvg-convert-binary", Duration::from_secs(1));
        let err = renderer.check_available().unwrap_err();
        assert!(err.to_string().contains("no-such-rsvg-convert-binary"));
    }
}
