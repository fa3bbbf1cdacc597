//! SVG document errors.

use thiserror::Error;

/// Errors raised while reading, inspecting or writing an SVG document.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("malformed XML at byte {position}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid UTF-8 in document")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("closing tag `</{found}>` does not match open element `<{expected}>`")]
    MismatchedEnd { expected: String, found: String },

    #[error("element `<{0}>` is never closed")]
    Unclosed(String),

    #[error("unexpected content after the root element")]
    TrailingContent,

    #[error("a page needs at least one layer")]
    EmptyPage,

    #[error("root attribute `{name}` is not a number: {value:?}")]
    InvalidDimension { name: &'static str, value: String },

    #[error("failed to serialize document")]
    Write(#[from] std::io::Error),
}
