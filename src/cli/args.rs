//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Keymap SVG to printable pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "keysheet.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render the keymap into a paginated PDF
    #[command(visible_alias = "p")]
    Pdf {
        #[command(flatten)]
        args: PdfArgs,
    },

    /// Write one cropped SVG per page, without rendering
    #[command(visible_alias = "s")]
    Split {
        #[command(flatten)]
        args: SplitArgs,
    },

    /// Regenerate the keymap SVG whenever its sources change
    #[command(visible_alias = "w")]
    Watch,
}

/// `pdf` command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PdfArgs {
    /// Source SVG (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output PDF (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Number of layers on each page
    #[arg(short = 'n', long)]
    pub layers_per_page: Option<usize>,

    /// Leave out a layer by name (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Shorthand for `--exclude COLEMAK`
    #[arg(long)]
    pub no_colemak: bool,

    /// Total canvas height used to size the last layer
    #[arg(long)]
    pub height: Option<f64>,

    /// Target page size in points, e.g. 612x792
    #[arg(long, value_name = "WxH")]
    pub page_size: Option<PageDimensions>,

    /// Seconds to wait for each page render
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Worker threads for rendering pages
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl PdfArgs {
    /// Exclusions from `--exclude` plus `--no-colemak`.
    pub fn excluded(&self) -> Vec<String> {
        let mut names = self.exclude.clone();
        if self.no_colemak && !names.iter().any(|n| n == "COLEMAK") {
            names.push("COLEMAK".to_owned());
        }
        names
    }
}

/// `split` command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SplitArgs {
    /// Source SVG (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Number of layers on each page
    #[arg(short = 'n', long)]
    pub layers_per_page: Option<usize>,

    /// Leave out a layer by name (repeatable; replaces the configured list)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// File name prefix of the written pages
    #[arg(long)]
    pub prefix: Option<String>,
}

/// `WIDTHxHEIGHT` in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

impl FromStr for PageDimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("`{part}` is not a number"))
        };
        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}
