//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Every call to [`process_with_diagnostics`] collects diagnostics
//! alongside the pipeline results.
//!
//! The core crate never reads a platform clock itself. Callers supply a
//! [`Clock`], which keeps this crate free of OS time sources and lets
//! tests run with a fake clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{PipelineError, ProcessResult, TraceConfig};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: pixmap decoding.
    pub decode: StageDiagnostics,
    /// Stage 2: contour tracing.
    pub tracing: StageDiagnostics,
    /// Stage 3: contour painting.
    pub paint: StageDiagnostics,
    /// Stage 4: corner detection and corner painting.
    pub corners: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Pixmap decoding metrics.
    Decode {
        /// Size of the input in bytes.
        input_bytes: usize,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Contour tracing metrics.
    Tracing {
        /// Number of contours found.
        contour_count: usize,
        /// Total number of points across all contours.
        total_points: usize,
        /// Point count of each contour, in discovery order.
        contour_lengths: Vec<usize>,
        /// Contours that returned to their start.
        closed: usize,
        /// Contours that ran out of candidates.
        open: usize,
        /// Contours stopped by the step budget.
        cycled: usize,
    },
    /// Contour painting metrics.
    Paint {
        /// Whether painting was enabled.
        enabled: bool,
        /// Number of cells written.
        cells_painted: usize,
    },
    /// Corner detection metrics.
    Corners {
        /// Window width in points.
        window: usize,
        /// Corner threshold in degrees.
        max_angle_deg: f64,
        /// Number of corners found.
        corner_count: usize,
        /// Number of corner cells written.
        cells_painted: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source width in pixels.
    pub image_width: u32,
    /// Source height in pixels.
    pub image_height: u32,
    /// Number of contours found.
    pub contour_count: usize,
    /// Number of corners found.
    pub corner_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Trace Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Tracing", &self.tracing),
            ("Paint", &self.paint),
            ("Corners", &self.corners),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Contours: {}  |  Corners: {}",
            self.summary.contour_count, self.summary.corner_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Tracing {
            contour_count,
            total_points,
            closed,
            open,
            cycled,
            ..
        } => format!(
            "{contour_count} contours, {total_points} pts (closed={closed} open={open} cycled={cycled})",
        ),
        StageMetrics::Paint {
            enabled,
            cells_painted,
        } => {
            if *enabled {
                format!("{cells_painted} cells")
            } else {
                "disabled".to_string()
            }
        }
        StageMetrics::Corners {
            window,
            max_angle_deg,
            corner_count,
            ..
        } => format!("window={window} max={max_angle_deg:.1}deg {corner_count} corners"),
    }
}

/// Run the full pipeline, timing each stage with `clock`.
///
/// Produces the same [`ProcessResult`] as [`crate::process`].
///
/// # Errors
///
/// Propagates any [`PipelineError`] raised by a stage.
pub fn process_with_diagnostics<C: Clock>(
    bytes: &[u8],
    config: &TraceConfig,
    clock: &C,
) -> Result<(ProcessResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();

    let start = clock.now();
    let decoded = Pipeline::new(bytes.to_vec(), config.clone()).decode()?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: decoded.metrics(),
    };

    let start = clock.now();
    let traced = decoded.trace()?;
    let tracing = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: traced.metrics(),
    };

    let start = clock.now();
    let painted = traced.paint()?;
    let paint = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: painted.metrics(),
    };

    let start = clock.now();
    let finished = painted.detect_corners()?;
    let corners = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: finished.metrics(),
    };

    let result = finished.into_result();
    let diagnostics = PipelineDiagnostics {
        decode,
        tracing,
        paint,
        corners,
        total_duration: clock.elapsed(&total_start),
        summary: PipelineSummary {
            image_width: result.dimensions.width,
            image_height: result.dimensions.height,
            contour_count: result.contours.len(),
            corner_count: result.corners.len(),
        },
    };

    Ok((result, diagnostics))
}
