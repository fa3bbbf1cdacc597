//! Grouping layers into pages.

use std::num::NonZeroUsize;

use thiserror::Error;

use super::layer::Layer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginateError {
    #[error("layers per page must be at least 1, got {0}")]
    InvalidPageSize(usize),
}

/// Validated number of layers per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    pub fn new(layers_per_page: usize) -> Result<Self, PaginateError> {
        NonZeroUsize::new(layers_per_page)
            .map(Self)
            .ok_or(PaginateError::InvalidPageSize(layers_per_page))
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }
}

/// Split `layers` into contiguous chunks of at most `size` layers.
///
/// Every layer lands in exactly one chunk, in input order; only the last
/// chunk may be short. No layers means no chunks.
pub fn paginate(layers: &[Layer], size: PageSize) -> Vec<&[Layer]> {
    layers.chunks(size.get()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(n: usize) -> Vec<Layer> {
        (0..n)
            .map(|i| Layer {
                name: format!("L{i}"),
                class: format!("layer-L{i}"),
                x_offset: 0.0,
                y_offset: i as f64 * 100.0,
                height: 100.0,
            })
            .collect()
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert_eq!(PageSize::new(0), Err(PaginateError::InvalidPageSize(0)));
        assert_eq!(PageSize::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_chunk_counts_and_coverage() {
        for n in 0..12 {
            for p in 1..6 {
                let input = layers(n);
                let pages = paginate(&input, PageSize::new(p).unwrap());

                assert_eq!(pages.len(), n.div_ceil(p), "n={n} p={p}");
                if let Some((last, full)) = pages.split_last() {
                    assert!(full.iter().all(|page| page.len() == p));
                    assert!(!last.is_empty() && last.len() <= p);
                }
                let flattened: Vec<_> = pages.iter().flat_map(|page| page.iter()).collect();
                assert_eq!(flattened, input.iter().collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_three_layers_two_per_page() {
        let input = layers(3);
        let pages = paginate(&input, PageSize::new(2).unwrap());
        let names: Vec<Vec<&str>> = pages
            .iter()
            .map(|page| page.iter().map(|l| l.name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["L0", "L1"], vec!["L2"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(paginate(&[], PageSize::new(2).unwrap()).is_empty());
    }
}
