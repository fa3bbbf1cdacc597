//! Command-line interface module.

mod args;
mod common;
pub mod pdf;
pub mod split;

pub use args::{Cli, Commands, PageDimensions, PdfArgs, SplitArgs};
