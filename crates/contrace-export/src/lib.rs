//! contrace-export: Pure format serializers (sans-IO)
//!
//! Converts tracing output into file formats: the painted raster as an
//! ASCII `P3` pixmap and the contours with their corners as an SVG
//! overlay.

pub mod ppm;
pub mod svg;

pub use ppm::to_ppm;
pub use svg::{SvgMetadata, SvgStyle, to_svg, to_svg_with};

/// Errors that can occur while serializing.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image encoder rejected the raster.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}
