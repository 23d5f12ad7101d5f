//! SVG export serializer.
//!
//! Wraps vectorized layers in an SVG document using the [`svg`] crate
//! for document construction and XML escaping. Each layer becomes one
//! `<g>` element carrying its color, and each path descriptor becomes a
//! `<path>` inside it. Descriptors are emitted verbatim, so coordinates
//! keep the pipeline's fixed three-digit formatting.
//!
//! Document width and height are the raster dimensions multiplied by the
//! same scale the layers were serialized with. With a scale of
//! `1 / px_per_mm` the document is sized in millimetres, which is what
//! laser cutter software expects.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::{Description, Element, Group, Path, Title};
use svg::node::{Node, Text};

use vectrace_pipeline::{Dimensions, VectorizedLayer};

/// Namespace for the machine-readable configuration block.
const VECTRACE_NS: &str = "https://vectrace.dev/ns/1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized vectorize configuration, emitted inside a
    /// `<metadata>` element wrapped in a namespaced `<vectrace:config>`
    /// element so exported files carry their settings.
    pub config_json: Option<&'a str>,
}

/// How a layer's paths are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerStyle {
    /// Filled regions (`fill` = layer color, no stroke).
    Fill,
    /// Outline rings (`stroke` = layer color, no fill).
    Stroke {
        /// Stroke width in document units.
        width: f64,
    },
}

/// One layer to export.
#[derive(Debug, Clone, Copy)]
pub struct SvgLayer<'a> {
    /// The vectorized paths and their color.
    pub layer: &'a VectorizedLayer,
    /// Paint style.
    pub style: LayerStyle,
}

impl<'a> SvgLayer<'a> {
    /// A filled layer.
    #[must_use]
    pub const fn fill(layer: &'a VectorizedLayer) -> Self {
        Self {
            layer,
            style: LayerStyle::Fill,
        }
    }

    /// A stroked outline layer.
    #[must_use]
    pub const fn stroke(layer: &'a VectorizedLayer, width: f64) -> Self {
        Self {
            layer,
            style: LayerStyle::Stroke { width },
        }
    }
}

/// Serialize layers into an SVG document string.
///
/// Layers are drawn in slice order (later layers on top). Layers without
/// paths are omitted. Each kept layer gets `id="layer-{index}"`, where
/// `index` is its position in `layers`.
///
/// `scale` is millimetres per cell and must match the scale the layers
/// were serialized with: one viewBox unit is one millimetre, and the
/// `width`/`height` attributes carry the `mm` unit.
#[must_use]
pub fn to_svg(
    layers: &[SvgLayer<'_>],
    dimensions: Dimensions,
    scale: f64,
    metadata: &SvgMetadata<'_>,
) -> String {
    let width = extent(dimensions.width, scale);
    let height = extent(dimensions.height, scale);
    let mut doc = Document::new()
        .set("width", format!("{width}mm"))
        .set("height", format!("{height}mm"))
        .set("viewBox", format!("0 0 {width} {height}"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("vectrace:config");
        config_el.assign("xmlns:vectrace", VECTRACE_NS);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for (index, svg_layer) in layers.iter().enumerate() {
        if svg_layer.layer.is_empty() {
            continue;
        }
        doc = doc.add(layer_group(index, svg_layer));
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

fn layer_group(index: usize, svg_layer: &SvgLayer<'_>) -> Group {
    let color = svg_layer.layer.color.to_hex();
    let group = Group::new().set("id", format!("layer-{index}"));
    let mut group = match svg_layer.style {
        LayerStyle::Fill => group
            .set("fill", color)
            .set("fill-rule", "evenodd")
            .set("stroke", "none"),
        LayerStyle::Stroke { width } => group
            .set("fill", "none")
            .set("stroke", color)
            .set("stroke-width", width),
    };
    for d in &svg_layer.layer.paths {
        group = group.add(Path::new().set("d", d.as_str()));
    }
    group
}

/// Scaled document extent with the same precision as path coordinates.
fn extent(cells: u32, scale: f64) -> String {
    format!("{:.3}", f64::from(cells) * scale)
}
