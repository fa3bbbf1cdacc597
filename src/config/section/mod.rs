//! Configuration section definitions.

mod pdf;
mod split;
mod watch;

pub use pdf::PdfConfig;
pub use split::SplitConfig;
pub use watch::{Rewrite, WatchConfig};
