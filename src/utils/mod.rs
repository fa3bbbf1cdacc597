//! Shared helpers.

pub mod exec;
pub mod path;

/// Format count with noun: `1 layer`, `3 layers`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "page"), "0 pages");
        assert_eq!(plural_count(1, "layer"), "1 layer");
        assert_eq!(plural_count(5, "layer"), "5 layers");
    }
}
