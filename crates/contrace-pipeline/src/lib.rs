//! contrace-pipeline: single-color contour tracing and corner detection
//! (sans-IO).
//!
//! Decodes a textual pixmap, walks the boundary of every region of one
//! target color, finds sharp bends along each boundary, and paints the
//! results back into the raster:
//! decode -> trace -> paint contours -> detect corners -> paint corners.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory byte
//! slices and returns structured data. Encoding and file handling live in
//! `contrace-export` and the `contrace` binary.

pub mod border;
pub mod contour;
pub mod corner;
pub mod decode;
pub mod diagnostics;
pub mod direction;
pub mod grid;
pub mod paint;
pub mod pipeline;
pub mod registry;
pub mod types;
pub mod view;

pub use contour::{ContourTracer, Step, trace_contours};
pub use corner::CornerDetector;
pub use direction::Direction;
pub use grid::{PixelGrid, Sample};
pub use pipeline::Pipeline;
pub use registry::TraceRegistry;
pub use types::{
    Closure, Color, Contour, Coordinate, CornerMark, Dimensions, PipelineError, ProcessResult,
    RgbImage, TraceConfig,
};

/// Run the full tracing pipeline.
///
/// Takes `P3` pixmap bytes and a configuration, then produces a
/// [`ProcessResult`] holding every contour, every corner mark, and the
/// (optionally painted) raster.
///
/// # Pipeline steps
///
/// 1. Validate the configuration and decode the pixmap
/// 2. Row-major scan, tracing each untraced border cell of the target color
/// 3. Paint contour `i` with `trace_palette[i % len]` (when `paint` is set)
/// 4. Sliding-window corner detection along every contour
/// 5. Paint corners with `corner_color` (when `paint` is set)
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the pixmap is malformed.
/// Returns [`PipelineError::Allocation`] if contour storage cannot grow.
pub fn process(bytes: &[u8], config: &TraceConfig) -> Result<ProcessResult, PipelineError> {
    let finished = Pipeline::new(bytes.to_vec(), config.clone())
        .decode()?
        .trace()?
        .paint()?
        .detect_corners()?;
    Ok(finished.into_result())
}
