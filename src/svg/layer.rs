//! Layer discovery and height inference.
//!
//! A layer is a direct child `<g>` of the root whose `class` starts with
//! `layer-`. Its vertical position comes from the first `translate(x, y)` in
//! its `transform`; heights are inferred from the next layer's offset, and the
//! last layer runs to the bottom of the canvas.

use std::sync::LazyLock;

use regex::Regex;

use super::error::SvgError;
use super::tree::{Document, Element};

/// Class prefix marking a layer group.
pub const LAYER_PREFIX: &str = "layer-";

/// Declared canvas size used when the root omits `width`/`height`.
pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 2508.0;

static TRANSLATE: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII whitespace only: the regex build has no Unicode classes.
    Regex::new(concat!(
        r"translate[ \t\r\n]*\([ \t\r\n]*([-+]?[0-9]*\.?[0-9]+)",
        r"[ \t\r\n]*,[ \t\r\n]*([-+]?[0-9]*\.?[0-9]+)[ \t\r\n]*\)",
    ))
    .expect("translate pattern is valid")
});

/// One keymap layer found in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Class without the `layer-` prefix.
    pub name: String,
    /// Full class label.
    pub class: String,
    pub x_offset: f64,
    pub y_offset: f64,
    /// Inferred; may be negative when offsets are not ascending.
    pub height: f64,
}

impl Layer {
    /// Bottom edge in document coordinates.
    pub fn y_end(&self) -> f64 {
        self.y_offset + self.height
    }
}

/// Declared `width`/`height` of the root element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// Read the root's declared size, falling back to the defaults when absent.
    pub fn from_root(root: &Element) -> Result<Self, SvgError> {
        Ok(Self {
            width: dimension(root, "width", DEFAULT_WIDTH)?,
            height: dimension(root, "height", DEFAULT_HEIGHT)?,
        })
    }
}

fn dimension(root: &Element, name: &'static str, default: f64) -> Result<f64, SvgError> {
    let Some(raw) = root.attr(name) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    trimmed
        .strip_suffix("px")
        .unwrap_or(trimmed)
        .trim()
        .parse()
        .map_err(|_| SvgError::InvalidDimension {
            name,
            value: raw.to_owned(),
        })
}

/// Layer name for an element, if it is a layer group.
pub fn layer_name(element: &Element) -> Option<&str> {
    if element.local_name() != "g" {
        return None;
    }
    element.attr("class")?.strip_prefix(LAYER_PREFIX)
}

/// Extract `(x, y)` from the first `translate(x, y)` in a transform.
///
/// Any other transform form yields `(0, 0)`.
pub fn parse_translate(transform: &str) -> (f64, f64) {
    TRANSLATE
        .captures(transform)
        .and_then(|caps| {
            let x = caps[1].parse().ok()?;
            let y = caps[2].parse().ok()?;
            Some((x, y))
        })
        .unwrap_or((0.0, 0.0))
}

/// Collect layers in document order with heights filled in.
///
/// `total_height` bounds the last layer. Zero layers is a valid result.
pub fn extract_layers(doc: &Document, total_height: f64) -> Vec<Layer> {
    let mut layers: Vec<Layer> = doc
        .root
        .child_elements()
        .filter_map(|element| {
            let name = layer_name(element)?;
            let (x_offset, y_offset) = element
                .attr("transform")
                .map_or((0.0, 0.0), parse_translate);
            Some(Layer {
                name: name.to_owned(),
                class: element.attr("class").unwrap_or_default().to_owned(),
                x_offset,
                y_offset,
                height: 0.0,
            })
        })
        .collect();

    infer_heights(&mut layers, total_height);
    layers
}

/// Single forward pass: each layer extends to the next one's offset.
pub fn infer_heights(layers: &mut [Layer], total_height: f64) {
    let offsets: Vec<f64> = layers.iter().map(|layer| layer.y_offset).collect();
    for (i, layer) in layers.iter_mut().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(total_height);
        layer.height = end - layer.y_offset;
    }
}

/// Layers whose offset is below the previous layer's (negative inferred height).
pub fn non_monotonic(layers: &[Layer]) -> impl Iterator<Item = &Layer> {
    layers
        .windows(2)
        .filter(|pair| pair[1].y_offset < pair[0].y_offset)
        .map(|pair| &pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(offsets: &[(&str, f64)], height: f64) -> Document {
        let mut source = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="960" height="{height}"><style>text {{}}</style>"#
        );
        for (name, y) in offsets {
            source.push_str(&format!(
                r#"<g class="layer-{name}" transform="translate(30, {y})"><rect/></g>"#
            ));
        }
        source.push_str("</svg>");
        Document::parse(&source).unwrap()
    }

    #[test]
    fn test_heights_from_offsets() {
        let doc = doc_with(&[("A", 0.0), ("B", 100.0), ("C", 250.0)], 400.0);
        let layers = extract_layers(&doc, 400.0);

        let heights: Vec<f64> = layers.iter().map(|l| l.height).collect();
        assert_eq!(heights, [100.0, 150.0, 150.0]);
    }

    #[test]
    fn test_names_classes_and_offsets() {
        let doc = doc_with(&[("QWERTY", 0.0), ("NAV", 120.5)], 400.0);
        let layers = extract_layers(&doc, 400.0);

        assert_eq!(layers[0].name, "QWERTY");
        assert_eq!(layers[0].class, "layer-QWERTY");
        assert_eq!(layers[1].y_offset, 120.5);
        assert_eq!(layers[1].x_offset, 30.0);
    }

    #[test]
    fn test_only_direct_layer_groups_qualify() {
        let doc = Document::parse(
            r#"<svg height="300">
                <g class="keys"/>
                <rect class="layer-FAKE"/>
                <svg:g class="layer-NS" transform="translate(0, 10)"/>
                <g class="layer-OUTER" transform="translate(0, 50)"><g class="layer-INNER"/></g>
            </svg>"#,
        )
        .unwrap();
        let names: Vec<_> = extract_layers(&doc, 300.0).into_iter().map(|l| l.name).collect();
        assert_eq!(names, ["NS", "OUTER"]);
    }

    #[test]
    fn test_no_layers_is_empty() {
        let doc = Document::parse(r#"<svg><defs/></svg>"#).unwrap();
        assert!(extract_layers(&doc, 100.0).is_empty());
    }

    #[test]
    fn test_parse_translate_forms() {
        assert_eq!(parse_translate("translate(30, 120)"), (30.0, 120.0));
        assert_eq!(parse_translate("translate( 30 ,120.5 )"), (30.0, 120.5));
        assert_eq!(parse_translate("scale(2) translate(1,2)"), (1.0, 2.0));
        assert_eq!(parse_translate("translate(-4, -8)"), (-4.0, -8.0));
        assert_eq!(parse_translate("matrix(1 0 0 1 30 40)"), (0.0, 0.0));
        assert_eq!(parse_translate("translate(30)"), (0.0, 0.0));
        assert_eq!(parse_translate(""), (0.0, 0.0));
    }

    #[test]
    fn test_parse_translate_tab_and_newline() {
        assert_eq!(parse_translate("translate(\t30,\n 120 )"), (30.0, 120.0));
        assert_eq!(parse_translate("translate\r\n(+1.5,-2)"), (1.5, -2.0));
    }

    #[test]
    fn test_translated_layers_extract() {
        let doc = Document::parse(
            r#"<svg width="960" height="300"><g class="layer-BASE" transform="translate(30, 0)"/><g class="layer-NAV" transform="translate(30, 180)"/></svg>"#,
        )
        .unwrap();
        let geometry: Vec<_> = extract_layers(&doc, 300.0)
            .into_iter()
            .map(|l| (l.name, l.y_offset, l.height))
            .collect();
        assert_eq!(
            geometry,
            [("BASE".to_owned(), 0.0, 180.0), ("NAV".to_owned(), 180.0, 120.0)]
        );
    }

    #[test]
    fn test_missing_transform_defaults_to_zero() {
        let doc = Document::parse(
            r#"<svg><g class="layer-A"/><g class="layer-B" transform="rotate(4)"/></svg>"#,
        )
        .unwrap();
        let layers = extract_layers(&doc, 50.0);
        assert_eq!(layers[0].y_offset, 0.0);
        assert_eq!(layers[1].y_offset, 0.0);
        assert_eq!(layers[0].height, 0.0);
        assert_eq!(layers[1].height, 50.0);
    }

    #[test]
    fn test_non_monotonic_offsets_give_negative_height() {
        let doc = doc_with(&[("A", 200.0), ("B", 100.0)], 400.0);
        let layers = extract_layers(&doc, 400.0);

        assert_eq!(layers[0].height, -100.0);
        assert_eq!(layers[1].height, 300.0);
        let flagged: Vec<_> = non_monotonic(&layers).map(|l| l.name.as_str()).collect();
        assert_eq!(flagged, ["B"]);
    }

    #[test]
    fn test_canvas_dimensions() {
        let doc = Document::parse(r#"<svg width="960px" height=" 2508 "/>"#).unwrap();
        let canvas = Canvas::from_root(&doc.root).unwrap();
        assert_eq!(canvas, Canvas { width: 960.0, height: 2508.0 });

        let doc = Document::parse("<svg/>").unwrap();
        let canvas = Canvas::from_root(&doc.root).unwrap();
        assert_eq!(canvas.width, DEFAULT_WIDTH);
        assert_eq!(canvas.height, DEFAULT_HEIGHT);

        let doc = Document::parse(r#"<svg width="wide"/>"#).unwrap();
        assert!(matches!(
            Canvas::from_root(&doc.root),
            Err(SvgError::InvalidDimension { name: "width", .. })
        ));
    }
}
