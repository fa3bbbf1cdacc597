//! The parse → rewrite → draw pipeline run on every trigger.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    config::{KeysheetConfig, Rewrite},
    debug,
    logger::WatchStatus,
    utils::exec::{Cmd, ExecError},
};

/// Install hint shown when the drawing tool is missing.
const INSTALL_HINT: &str = "install keymap-drawer: pip install keymap-drawer";

/// External commands that turn the keymap source into an SVG.
#[derive(Debug, Clone)]
pub struct Regenerate {
    root: PathBuf,
    keymap: PathBuf,
    drawer_config: PathBuf,
    intermediate: PathBuf,
    output: PathBuf,
    program: String,
    timeout: Duration,
    rewrites: Vec<Rewrite>,
}

impl Regenerate {
    pub fn from_config(config: &KeysheetConfig) -> Self {
        let watch = &config.watch;
        Self {
            root: config.root.clone(),
            keymap: watch.keymap.clone(),
            drawer_config: watch.drawer_config.clone(),
            intermediate: watch.intermediate.clone(),
            output: watch.output.clone(),
            program: watch.program.clone(),
            timeout: Duration::from_secs(watch.timeout_secs),
            rewrites: watch.rewrite.clone(),
        }
    }

    /// `<program> parse -z <keymap> -o <intermediate>`
    pub(super) fn parse_cmd(&self) -> Cmd {
        Cmd::new(&self.program)
            .args(["parse", "-z"])
            .arg(&self.keymap)
            .arg("-o")
            .arg(&self.intermediate)
            .cwd(&self.root)
            .timeout(self.timeout)
    }

    /// `<program> -c <drawer_config> draw <intermediate> -o <output>`
    pub(super) fn draw_cmd(&self) -> Cmd {
        Cmd::new(&self.program)
            .arg("-c")
            .arg(&self.drawer_config)
            .arg("draw")
            .arg(&self.intermediate)
            .arg("-o")
            .arg(&self.output)
            .cwd(&self.root)
            .timeout(self.timeout)
    }

    /// Run every step, reporting each one. Returns whether all succeeded.
    ///
    /// Failures are reported and swallowed: the caller keeps watching.
    pub fn run(&self, status: &WatchStatus) -> bool {
        if let Err(err) = self.parse_cmd().run() {
            self.report(status, "parse", &err);
            return false;
        }
        status.success(&format!("parsed {}", self.keymap.display()));

        let intermediate = self.root.join(&self.intermediate);
        match rewrite_file(&intermediate, &self.rewrites) {
            Ok(0) => {}
            Ok(n) => debug!("watch"; "applied {n} rewrite(s) to {}", self.intermediate.display()),
            Err(err) => {
                status.error(
                    &format!("failed to rewrite {}", self.intermediate.display()),
                    &err.to_string(),
                );
                return false;
            }
        }

        if let Err(err) = self.draw_cmd().run() {
            self.report(status, "draw", &err);
            return false;
        }
        status.success(&format!("drew {}", self.output.display()));
        true
    }

    fn report(&self, status: &WatchStatus, step: &str, err: &ExecError) {
        if err.is_not_found() {
            status.error(&format!("`{}` command not found", self.program), INSTALL_HINT);
            return;
        }
        let detail = err.diagnostic().map_or_else(|| err.to_string(), str::to_owned);
        status.error(&format!("{step} step failed"), &detail);
    }
}

/// Apply literal replacements in order. Returns the text and how many
/// rewrites matched.
pub fn apply_rewrites(text: &str, rewrites: &[Rewrite]) -> (String, usize) {
    rewrites
        .iter()
        .fold((text.to_owned(), 0), |(text, applied), rewrite| {
            if text.contains(&rewrite.from) {
                (text.replace(&rewrite.from, &rewrite.to), applied + 1)
            } else {
                (text, applied)
            }
        })
}

/// Rewrite `path` in place, leaving it untouched when nothing matches.
fn rewrite_file(path: &Path, rewrites: &[Rewrite]) -> std::io::Result<usize> {
    if rewrites.is_empty() {
        return Ok(0);
    }
    let text = std::fs::read_to_string(path)?;
    let (rewritten, applied) = apply_rewrites(&text, rewrites);
    if applied > 0 {
        std::fs::write(path, rewritten)?;
    }
    Ok(applied)
}
