//! Watch mode: regenerate the keymap SVG when its sources change.
//!
//! ```text
//! notify (parent dirs) ─► watched-file match ─► debouncer ─► Regenerate
//! ```
//!
//! Runs until Ctrl+C. Step failures are reported and the loop keeps going.

mod debouncer;
mod regenerate;

#[cfg(test)]
mod tests;

pub use regenerate::{Regenerate, apply_rewrites};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use notify::{RecursiveMode, Watcher};
use owo_colors::Style;

use crate::{
    config::KeysheetConfig,
    core::is_shutdown,
    debug, log,
    logger::{WatchStatus, paint},
    utils::path::relative_to,
};
use debouncer::{Debouncer, is_content_change};

/// How often the loop wakes up to check for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The source files whose changes trigger a regeneration.
#[derive(Debug, Clone)]
pub struct WatchedFiles {
    files: Vec<PathBuf>,
}

impl WatchedFiles {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: paths.into_iter().map(|path| canonical_file(&path)).collect(),
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Distinct parent directories, watched non-recursively.
    pub fn dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = Vec::new();
        for dir in self.files.iter().filter_map(|file| file.parent()) {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    /// The watched file a content change refers to, if any.
    pub fn matching(&self, event: &notify::Event) -> Option<&Path> {
        if !is_content_change(&event.kind) {
            return None;
        }
        event.paths.iter().find_map(|path| {
            let path = canonical_file(path);
            self.files
                .iter()
                .find(|file| **file == path)
                .map(PathBuf::as_path)
        })
    }
}

/// Canonical parent joined with the file name, so paths compare equal even
/// while the file itself is being replaced.
fn canonical_file(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            crate::utils::path::normalize_path(parent).join(name)
        }
        _ => crate::utils::path::normalize_path(path),
    }
}

/// Entry point for `keysheet watch`.
pub fn watch_keymap(config: &KeysheetConfig) -> Result<()> {
    let status = WatchStatus::new();
    let regenerate = Regenerate::from_config(config);
    let files = WatchedFiles::new([
        config.root_join(&config.watch.keymap),
        config.root_join(&config.watch.drawer_config),
    ]);

    log!("watch"; "{}", paint("Starting keymap watcher", Style::new().bold()));
    regenerate.run(&status);

    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("Failed to create file watcher")?;
    for dir in files.dirs() {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    log!("watch"; "watching:");
    for file in files.files() {
        println!("  - {}", relative_to(&config.root, file).display());
    }
    log!("watch"; "Press Ctrl+C to stop watching");

    let debouncer = Debouncer::new(Duration::from_millis(config.watch.debounce_ms));
    event_loop(&rx, &files, debouncer, is_shutdown, |path| {
        log!("watch"; "{} changed", relative_to(&config.root, path).display());
        regenerate.run(&status);
    });

    drop(watcher);
    log!("watch"; "Stopping watcher...");
    Ok(())
}

/// Dispatch relevant, debounced changes to `on_change` until `stop` returns
/// true or the event source goes away. Returns the number of triggers.
fn event_loop(
    rx: &Receiver<notify::Result<notify::Event>>,
    files: &WatchedFiles,
    mut debouncer: Debouncer,
    stop: impl Fn() -> bool,
    mut on_change: impl FnMut(&Path),
) -> usize {
    let mut triggers = 0;
    while !stop() {
        let event = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => event,
            Ok(Err(err)) => {
                log!("watch"; "watcher error: {err}");
                continue;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let Some(path) = files.matching(&event) else {
            continue;
        };
        if !debouncer.should_trigger(Instant::now()) {
            debug!("watch"; "debounced {}", path.display());
            continue;
        }
        triggers += 1;
        on_change(path);
    }
    triggers
}
