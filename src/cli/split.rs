//! `split` command: one cropped SVG file per page, no rendering.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::common::{load_keymap, report_layers};
use crate::{
    config::KeysheetConfig,
    log,
    svg::PageSize,
    utils::{path::relative_to, plural_count},
};

/// Entry point for `keysheet split`.
pub fn split_keymap(config: &KeysheetConfig) -> Result<()> {
    let split = &config.split;
    let input = config.root_join(&split.input);
    let dir = input.parent().unwrap_or(&config.root).to_path_buf();

    let written = write_pages(
        &input,
        &dir,
        &split.prefix,
        &split.exclude,
        split.layers_per_page,
    )?;

    for (path, layers) in &written {
        log!(
            "split";
            "Created {} with {}",
            relative_to(&config.root, path).display(),
            plural_count(*layers, "layer")
        );
    }
    log!("split"; "{} written", plural_count(written.len(), "page"));
    Ok(())
}

/// Write `<prefix><K>.svg` (K from 1) into `dir` for every page.
///
/// Returns each written path with its layer count. Zero layers writes nothing.
pub fn write_pages(
    input: &Path,
    dir: &Path,
    prefix: &str,
    exclude: &[String],
    layers_per_page: usize,
) -> Result<Vec<(PathBuf, usize)>> {
    let size = PageSize::new(layers_per_page)?;
    let keymap = load_keymap(input, None)?;
    report_layers("split", &keymap, exclude);

    let pages = keymap
        .pages(exclude, size)
        .with_context(|| format!("Failed to build pages from {}", input.display()))?;

    pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let path = dir.join(format!("{prefix}{}.svg", index + 1));
            let svg = page.doc.to_bytes()?;
            std::fs::write(&path, svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok((path, page.layers.len()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::{Document, extract_layers};
    use tempfile::TempDir;

    const KEYMAP: &str = r#"<svg width="960" height="700">
<style>.key { stroke: #000; }</style>
<g class="layer-QWERTY" transform="translate(30, 0)"/>
<g class="layer-COLEMAK" transform="translate(30, 100)"/>
<g class="layer-SYM" transform="translate(30, 200)"/>
<g class="layer-NUM" transform="translate(30, 300)"/>
<g class="layer-NAV" transform="translate(30, 400)"/>
<g class="layer-FN" transform="translate(30, 550)"/>
</svg>"#;

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("keymap.svg");
        std::fs::write(&input, KEYMAP).unwrap();
        (dir, input)
    }

    #[test]
    fn test_default_grouping() {
        let (dir, input) = fixture();
        let exclude = vec!["COLEMAK".to_owned()];

        let written = write_pages(&input, dir.path(), "keymap_page", &exclude, 3).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|(path, n)| (path.file_name().unwrap().to_str().unwrap().to_owned(), *n))
            .collect();
        assert_eq!(
            names,
            [("keymap_page1.svg".to_owned(), 3), ("keymap_page2.svg".to_owned(), 2)]
        );

        let first = Document::parse(&std::fs::read_to_string(&written[0].0).unwrap()).unwrap();
        assert_eq!(first.root.attr("viewBox"), Some("0 0 960 400"));
        let layers: Vec<_> = extract_layers(&first, 400.0)
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(layers, ["QWERTY", "SYM", "NUM"]);

        let second = std::fs::read_to_string(&written[1].0).unwrap();
        assert!(second.contains(r#"viewBox="0 400 960 300""#));
        assert!(second.contains(".key { stroke: #000; }"));
        assert!(!second.contains("layer-COLEMAK"));
    }

    #[test]
    fn test_no_layers_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("keymap.svg");
        std::fs::write(&input, "<svg><defs/></svg>").unwrap();

        let written = write_pages(&input, dir.path(), "keymap_page", &[], 3).unwrap();

        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_zero_group_size_rejected() {
        let (dir, input) = fixture();
        assert!(write_pages(&input, dir.path(), "p", &[], 0).is_err());
        assert!(!dir.path().join("p1.svg").exists());
    }
}
