//! vectrace-export: Pure format serializers (sans-IO)
//!
//! Converts vectorized layers into output formats. Currently supports SVG.

pub mod svg;

pub use svg::{LayerStyle, SvgLayer, SvgMetadata, to_svg};
