//! Terminal output: prefixed log lines, watch-mode status and page progress.
//!
//! # Example
//!
//! ```ignore
//! log!("pdf"; "found {} layers", count);
//!
//! let progress = ProgressLine::new("render", "pages", 4);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream, Style};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Set while a progress line occupies the bottom of the terminal.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    let progress = PROGRESS_ACTIVE.load(Ordering::SeqCst);
    if progress {
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let style = match module.to_ascii_lowercase().as_str() {
        "watch" => Style::new().bright_green().bold(),
        "error" => Style::new().bright_red().bold(),
        "render" | "merge" => Style::new().bright_blue().bold(),
        _ => Style::new().bright_yellow().bold(),
    };
    paint(&format!("[{module}]"), style)
}

/// Style `text` for stdout unless colors are off (`--color never`, no TTY).
pub fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stdout, |text| text.style(style))
        .to_string()
}

// ============================================================================
// Watch Status
// ============================================================================

/// Outcome of one watch-mode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
}

impl Status {
    fn symbol(self) -> String {
        match self {
            Self::Success => paint("✓", Style::new().green()),
            Self::Error => paint("✗", Style::new().red()),
            Self::Warning => paint("⚠", Style::new().yellow()),
        }
    }
}

/// Local wall-clock time as `HH:MM:SS`.
fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Timestamped status line; `detail` goes on the following lines.
pub fn format_status(timestamp: &str, status: Status, summary: &str, detail: &str) -> String {
    let timestamp = paint(&format!("[{timestamp}]"), Style::new().dimmed());
    let mut line = format!("{timestamp} {} {summary}", status.symbol());
    let detail = detail.trim_end();
    if !detail.is_empty() {
        line.push('\n');
        line.push_str(detail);
    }
    line
}

/// Timestamped status lines for watch mode.
///
/// Every line is kept: a failed run stays visible above the next success.
///
/// ```ignore
/// let status = WatchStatus::new();
/// status.success("parsed config/toucan.keymap");
/// status.error("draw failed", "config.yaml: unknown key");
/// ```
#[derive(Debug, Default)]
pub struct WatchStatus {
    lock: Mutex<()>,
}

impl WatchStatus {
    pub const fn new() -> Self {
        Self {
            lock: parking_lot::const_mutex(()),
        }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&self, message: &str) {
        self.display(Status::Success, message, "");
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&self, summary: &str, detail: &str) {
        self.display(Status::Error, summary, detail);
    }

    /// Display warning message (⚠ prefix, yellow).
    pub fn warning(&self, message: &str) {
        self.display(Status::Warning, message, "");
    }

    fn display(&self, status: Status, summary: &str, detail: &str) {
        let _guard = self.lock.lock();
        let mut stdout = stdout().lock();
        writeln!(stdout, "{}", format_status(&now(), status, summary, detail)).ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Progress Line
// ============================================================================

/// Single-line counter, redrawn in place: `[render] pages(2/5)`.
///
/// Safe to bump from worker threads; a redraw is skipped when another thread
/// is already drawing.
pub struct ProgressLine {
    module: &'static str,
    label: &'static str,
    total: usize,
    current: AtomicUsize,
    lock: Mutex<()>,
}

impl ProgressLine {
    pub fn new(module: &'static str, label: &'static str, total: usize) -> Self {
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            module,
            label,
            total,
            current: AtomicUsize::new(0),
            lock: Mutex::new(()),
        };
        progress.display(false);
        progress
    }

    /// Count one finished item.
    #[inline]
    pub fn inc(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.lock.try_lock() {
            self.display(false);
        }
    }

    fn line(&self) -> String {
        format!(
            "{} {}({}/{})",
            colorize_prefix(self.module),
            self.label,
            self.current.load(Ordering::Relaxed),
            self.total
        )
    }

    fn display(&self, newline: bool) {
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(stdout, "{}", self.line()).ok();
        } else {
            write!(stdout, "{}", self.line()).ok();
        }
        stdout.flush().ok();
    }

    /// Keep the final counts on screen and move to the next line.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            self.display(true);
        }
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);

        // Unfinished progress (error path) is erased.
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}
