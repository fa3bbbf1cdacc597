//! Page rendering and merging collaborators.
//!
//! The core hands each page document to a [`PageRenderer`] together with the
//! target size computed by [`fit_to_page`], then passes the per-page files to
//! a [`DocumentMerger`] in page order.
//!
//! - [`rsvg`]: renderer backed by the `rsvg-convert` executable
//! - [`merge`]: in-process PDF concatenation with `lopdf`

mod merge;
mod rsvg;

pub use merge::{DocumentMerger, LopdfMerger, MergeError};
pub use rsvg::RsvgConvert;

use std::path::Path;

use thiserror::Error;

use crate::utils::exec::ExecError;

/// US Letter in points (72 points per inch).
pub const LETTER_WIDTH_PT: f64 = 612.0;
pub const LETTER_HEIGHT_PT: f64 = 792.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("page of {width}x{height} cannot be scaled onto {target_width}x{target_height}")]
    InvalidSize {
        width: f64,
        height: f64,
        target_width: f64,
        target_height: f64,
    },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Output dimensions of a rendered page, in whole points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Scale `(width, height)` uniformly onto `(target_width, target_height)`.
///
/// Width is fitted first; when the scaled height would overflow the target,
/// the height constrains instead. Both results are floored.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_to_page(
    (width, height): (f64, f64),
    (target_width, target_height): (f64, f64),
) -> Result<RenderSize, RenderError> {
    let invalid = || RenderError::InvalidSize {
        width,
        height,
        target_width,
        target_height,
    };
    if !(width > 0.0 && height > 0.0 && target_width > 0.0 && target_height > 0.0) {
        return Err(invalid());
    }

    let mut scale = target_width / width;
    if height * scale > target_height {
        scale = target_height / height;
    }

    let size = RenderSize {
        width: (width * scale).floor() as u32,
        height: (height * scale).floor() as u32,
    };
    if size.width == 0 || size.height == 0 {
        return Err(invalid());
    }
    Ok(size)
}

/// Rasterizes one page document to a fixed-format file.
pub trait PageRenderer: Sync {
    /// Program or backend name for messages.
    fn name(&self) -> &str;

    /// Render `svg` at `size` into `output`.
    fn render(&self, svg: &[u8], size: RenderSize, output: &Path) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: (f64, f64) = (LETTER_WIDTH_PT, LETTER_HEIGHT_PT);

    #[test]
    fn test_wide_page_fits_width() {
        // scale 0.5
        let size = fit_to_page((1224.0, 330.0), LETTER).unwrap();
        assert_eq!(size, RenderSize { width: 612, height: 165 });
    }

    #[test]
    fn test_tall_page_fits_height() {
        // fitting width would give 612x3168, so height constrains at 0.5
        let size = fit_to_page((306.0, 1584.0), LETTER).unwrap();
        assert_eq!(size, RenderSize { width: 153, height: 792 });
    }

    #[test]
    fn test_exact_aspect() {
        let size = fit_to_page((612.0, 792.0), LETTER).unwrap();
        assert_eq!(size, RenderSize { width: 612, height: 792 });
    }

    #[test]
    fn test_uniform_scale_is_min_of_ratios() {
        for (w, h) in [(960.0, 140.0), (100.0, 900.0), (960.0, 660.0), (3.0, 4.0)] {
            let size = fit_to_page((w, h), LETTER).unwrap();
            let scale = (LETTER.0 / w).min(LETTER.1 / h);
            assert_eq!(size.width, (w * scale).floor() as u32);
            assert_eq!(size.height, (h * scale).floor() as u32);
            assert!(size.width <= 612 && size.height <= 792);
        }
    }

    #[test]
    fn test_degenerate_sizes_rejected() {
        assert!(fit_to_page((960.0, 0.0), LETTER).is_err());
        assert!(fit_to_page((960.0, -140.0), LETTER).is_err());
        assert!(fit_to_page((0.0, 100.0), LETTER).is_err());
        assert!(fit_to_page((960.0, 100.0), (0.0, 792.0)).is_err());
        // scales to less than one point tall
        assert!(fit_to_page((100_000.0, 1.0), LETTER).is_err());
    }
}
