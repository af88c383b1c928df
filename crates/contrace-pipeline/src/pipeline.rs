//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use contrace_pipeline::{Pipeline, TraceConfig, PipelineError};
//! # fn run(ppm: Vec<u8>) -> Result<(), PipelineError> {
//! let finished = Pipeline::new(ppm, TraceConfig::default())
//!     .decode()?
//!     .trace()?
//!     .paint()?
//!     .detect_corners()?;
//!
//! let result = finished.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state.
//! Tracing borrows the decoded raster immutably; the raster only becomes
//! writable in [`Traced::paint`], after every contour has been found, so
//! painted cells can never feed back into border classification.

use crate::contour::trace_contours;
use crate::corner::CornerDetector;
use crate::decode::decode_pixmap;
use crate::diagnostics::StageMetrics;
use crate::paint::{paint_contours, paint_corners};
use crate::registry::TraceRegistry;
use crate::types::{
    Closure, Contour, CornerMark, Dimensions, PipelineError, ProcessResult, RgbImage, TraceConfig,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing, call .decode() to continue"]
pub struct Pending {
    config: TraceConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The configuration this run will use.
    #[must_use]
    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Validate the configuration, decode the source pixmap and advance
    /// to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the configuration is
    /// rejected by [`TraceConfig::validate`]. Returns
    /// [`PipelineError::EmptyInput`] if the source bytes are empty and
    /// [`PipelineError::ImageDecode`] if they are not a valid pixmap.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let source_len = self.source.len();
        let image = decode_pixmap(&self.source)?;
        let dimensions = Dimensions {
            width: image.width(),
            height: image.height(),
        };
        tracing::debug!(
            input_bytes = source_len,
            width = dimensions.width,
            height = dimensions.height,
            "decoded pixmap"
        );
        Ok(Decoded {
            config: self.config,
            source_len,
            image,
            dimensions,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding.
///
/// Call [`trace`](Self::trace) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing, call .trace() to continue"]
pub struct Decoded {
    config: TraceConfig,
    source_len: usize,
    image: RgbImage,
    dimensions: Dimensions,
}

impl Decoded {
    /// The decoded raster.
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Raster dimensions in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Metrics for the decode step.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Decode {
            input_bytes: self.source_len,
            width: self.dimensions.width,
            height: self.dimensions.height,
            pixel_count: u64::from(self.dimensions.width) * u64::from(self.dimensions.height),
        }
    }

    /// Trace every border of `config.target_color` and advance to the
    /// [`Traced`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if contour storage cannot
    /// grow.
    pub fn trace(self) -> Result<Traced, PipelineError> {
        let registry = trace_contours(&self.image, self.config.target_color)?;
        tracing::debug!(
            contours = registry.len(),
            points = registry.total_points(),
            "tracing finished"
        );
        Ok(Traced {
            config: self.config,
            image: self.image,
            dimensions: self.dimensions,
            registry,
        })
    }
}

// ───────────────────────── Stage 2: Traced ───────────────────────────

/// Pipeline state after contour tracing.
///
/// Call [`paint`](Self::paint) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing, call .paint() to continue"]
pub struct Traced {
    config: TraceConfig,
    image: RgbImage,
    dimensions: Dimensions,
    registry: TraceRegistry,
}

impl Traced {
    /// Every traced contour, in discovery order.
    #[must_use]
    pub const fn registry(&self) -> &TraceRegistry {
        &self.registry
    }

    /// The traced contours.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        self.registry.contours()
    }

    /// Metrics for the tracing step.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        let contours = self.registry.contours();
        let count = |closure: Closure| contours.iter().filter(|c| c.closure() == closure).count();
        StageMetrics::Tracing {
            contour_count: contours.len(),
            total_points: self.registry.total_points(),
            contour_lengths: contours.iter().map(Contour::len).collect(),
            closed: count(Closure::Closed),
            open: count(Closure::Open),
            cycled: count(Closure::Cycled),
        }
    }

    /// Paint contours into the raster (when `config.paint` is set) and
    /// advance to the [`Painted`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutOfBounds`] if a contour point lies
    /// outside the raster. Contours traced from this raster never do.
    pub fn paint(self) -> Result<Painted, PipelineError> {
        let mut image = self.image;
        let painted = if self.config.paint {
            paint_contours(&mut image, &self.registry, &self.config.trace_palette)?
        } else {
            0
        };
        Ok(Painted {
            config: self.config,
            image,
            dimensions: self.dimensions,
            contours: self.registry.into_contours(),
            painted,
        })
    }
}

// ───────────────────────── Stage 3: Painted ──────────────────────────

/// Pipeline state after painting contours.
///
/// Call [`detect_corners`](Self::detect_corners) to advance to the
/// final stage.
#[must_use = "pipeline stages are consumed by advancing, call .detect_corners() to continue"]
pub struct Painted {
    config: TraceConfig,
    image: RgbImage,
    dimensions: Dimensions,
    contours: Vec<Contour>,
    painted: usize,
}

impl Painted {
    /// The raster with contours painted (unchanged if painting is off).
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// The traced contours.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Metrics for the painting step.
    #[must_use]
    pub const fn metrics(&self) -> StageMetrics {
        StageMetrics::Paint {
            enabled: self.config.paint,
            cells_painted: self.painted,
        }
    }

    /// Run corner detection on every contour, paint the marks (when
    /// `config.paint` is set) and advance to the [`Finished`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the corner window is
    /// unusable, or [`PipelineError::OutOfBounds`] if a corner lies
    /// outside the raster.
    pub fn detect_corners(self) -> Result<Finished, PipelineError> {
        let detector = CornerDetector::from_config(&self.config)?;
        let corners = detector.detect_all(&self.contours);
        tracing::debug!(corners = corners.len(), "corner detection finished");

        let mut image = self.image;
        let painted = if self.config.paint {
            paint_corners(&mut image, &corners, self.config.corner_color)?
        } else {
            0
        };
        Ok(Finished {
            config: self.config,
            image,
            dimensions: self.dimensions,
            contours: self.contours,
            corners,
            painted,
        })
    }
}

// ───────────────────────── Stage 4: Finished ─────────────────────────

/// Final pipeline state.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`ProcessResult`].
#[must_use = "call .into_result() to extract the output"]
pub struct Finished {
    config: TraceConfig,
    image: RgbImage,
    dimensions: Dimensions,
    contours: Vec<Contour>,
    corners: Vec<CornerMark>,
    painted: usize,
}

impl Finished {
    /// The final raster.
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// The traced contours.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Corner marks across all contours.
    #[must_use]
    pub fn corners(&self) -> &[CornerMark] {
        &self.corners
    }

    /// Metrics for the corner step.
    #[must_use]
    pub fn metrics(&self) -> StageMetrics {
        StageMetrics::Corners {
            window: self.config.corner_window,
            max_angle_deg: self.config.corner_angle_deg,
            corner_count: self.corners.len(),
            cells_painted: self.painted,
        }
    }

    /// Consume the pipeline and return its output.
    pub fn into_result(self) -> ProcessResult {
        ProcessResult {
            contours: self.contours,
            corners: self.corners,
            image: self.image,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────────── Entry point ───────────────────────────────

/// Entry point for the step-by-step pipeline.
///
/// Each stage method consumes the current state and returns the next,
/// making it a compile-time error to skip stages or call them out of
/// order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from pixmap bytes and config.
    ///
    /// No processing is performed; call [`.decode()`](Pending::decode)
    /// to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(source: Vec<u8>, config: TraceConfig) -> Pending {
        Pending { config, source }
    }
}
