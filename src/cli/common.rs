//! Steps shared by the `pdf` and `split` commands.

use std::path::Path;

use anyhow::{Result, bail};

use crate::{
    log,
    logger::WatchStatus,
    svg::{self, Keymap, PageDocument, number, non_monotonic},
    utils::plural_count,
};

/// Load the source SVG and discover its layers.
pub fn load_keymap(input: &Path, height: Option<f64>) -> Result<Keymap> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }
    let doc = svg::load(input)?;
    let keymap = Keymap::new(doc, height)?;
    warn_non_monotonic(&keymap);
    Ok(keymap)
}

/// Offsets going back up produce negative heights; the pages are still built.
fn warn_non_monotonic(keymap: &Keymap) {
    let status = WatchStatus::new();
    for layer in non_monotonic(&keymap.layers) {
        status.warning(&format!(
            "layer {} starts above the previous layer (y={}); its predecessor gets a negative height",
            layer.name,
            number(layer.y_offset)
        ));
    }
}

/// Print discovered layers and the exclusions that will apply.
pub fn report_layers<S: AsRef<str>>(module: &str, keymap: &Keymap, excluded: &[S]) {
    log!(
        module;
        "SVG dimensions: {}x{}",
        number(keymap.canvas.width),
        number(keymap.canvas.height)
    );
    log!(module; "found {}:", plural_count(keymap.layers.len(), "layer"));
    for layer in &keymap.layers {
        println!(
            "  - {}: y={}, height≈{}",
            layer.name,
            number(layer.y_offset),
            number(layer.height)
        );
    }
    if !excluded.is_empty() {
        let names: Vec<&str> = excluded.iter().map(AsRef::as_ref).collect();
        log!(module; "excluding: {}", names.join(", "));
    }
}

/// Print which layers ended up on which page.
pub fn report_pages(module: &str, pages: &[PageDocument]) {
    log!(module; "creating {}", plural_count(pages.len(), "page"));
    for (index, page) in pages.iter().enumerate() {
        println!("  page {}: {}", index + 1, page.layers.join(", "));
    }
}

/// Total number of layers placed on pages.
pub fn layer_total(pages: &[PageDocument]) -> usize {
    pages.iter().map(|page| page.layers.len()).sum()
}
