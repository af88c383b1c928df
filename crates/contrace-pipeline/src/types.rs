//! Shared types for the contrace tracing pipeline.

use std::collections::TryReserveError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can reference the decoded
/// and painted rasters without depending on `image` directly.
pub use image::RgbImage;

/// An exact RGB color.
///
/// Equality is component-wise with no tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const CYAN: Self = Self::new(0, 255, 255);

    /// Create a color from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { r, g, b }
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        Self([color.r, color.g, color.b])
    }
}

/// Parses `"R,G,B"` with decimal channels, e.g. `"255,0,0"`.
impl FromStr for Color {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut channels = s.split(',').map(str::trim);
        let mut next = |name: &str| -> Result<u8, PipelineError> {
            let raw = channels.next().ok_or_else(|| {
                PipelineError::InvalidConfig(format!("color '{s}' is missing the {name} channel"))
            })?;
            raw.parse().map_err(|e| {
                PipelineError::InvalidConfig(format!("invalid {name} channel '{raw}' in '{s}': {e}"))
            })
        };
        let color = Self::new(next("red")?, next("green")?, next("blue")?);
        if channels.next().is_some() {
            return Err(PipelineError::InvalidConfig(format!(
                "color must be 'R,G,B', got: '{s}'"
            )));
        }
        Ok(color)
    }
}

/// An integer grid position.
///
/// Signed so that the neighbors of edge cells can be expressed before
/// they are checked against the grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column, increasing to the east.
    pub x: i64,
    /// Row, increasing to the south.
    pub y: i64,
}

impl Coordinate {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The neighboring coordinate one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: crate::Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to another coordinate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distance(self, other: Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}

/// How a trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Closure {
    /// The walk stepped back onto its start coordinate.
    Closed,
    /// No admissible neighbor was found; the contour is an open curve.
    Open,
    /// The walk exceeded the number of distinct `(coordinate, heading)`
    /// states in the grid without returning to its start, so it was
    /// repeating itself and was stopped.
    Cycled,
}

/// An ordered boundary of one target color, as produced by the tracer.
///
/// The start coordinate is stored once; a closed contour does not
/// repeat it at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    color: Color,
    points: Vec<Coordinate>,
    closure: Closure,
}

impl Contour {
    /// Create a contour from an already traced coordinate sequence.
    #[must_use]
    pub const fn new(color: Color, points: Vec<Coordinate>, closure: Closure) -> Self {
        Self {
            color,
            points,
            closure,
        }
    }

    /// The target color every member was traced against.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// All coordinates in trace order.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of coordinates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no coordinates.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The start coordinate, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Coordinate> {
        self.points.first()
    }

    /// The last coordinate appended before the trace stopped.
    #[must_use]
    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    /// How the trace ended.
    #[must_use]
    pub const fn closure(&self) -> Closure {
        self.closure
    }

    /// Returns `true` if the trace returned to its start.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.closure, Closure::Closed)
    }

    /// Linear membership test.
    #[must_use]
    pub fn contains(&self, at: Coordinate) -> bool {
        self.points.contains(&at)
    }

    /// Consumes the contour and returns its coordinates.
    #[must_use]
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }
}

/// A coordinate flagged as a local curvature extremum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerMark {
    /// The flagged coordinate (the middle point of its window).
    pub at: Coordinate,
    /// Index of the owning contour in the registry.
    pub contour: usize,
    /// Position of `at` inside the owning contour.
    pub position: usize,
    /// Included angle at `at`, in radians.
    pub angle: f64,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for a tracing run.
///
/// Construct with [`Default`] and override fields, then call
/// [`validate`](Self::validate) (the pipeline does this on entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Color whose boundaries are traced.
    pub target_color: Color,

    /// Corner window width in contour points. Must be odd and at least 3.
    pub corner_window: usize,

    /// Largest included angle, in degrees, still considered a corner.
    pub corner_angle_deg: f64,

    /// Colors cycled through when painting successive contours.
    pub trace_palette: Vec<Color>,

    /// Color painted over detected corners.
    pub corner_color: Color,

    /// Whether to paint contours and corners into the output image.
    pub paint: bool,
}

impl TraceConfig {
    pub const DEFAULT_TARGET_COLOR: Color = Color::BLACK;
    pub const DEFAULT_CORNER_WINDOW: usize = 7;
    pub const DEFAULT_CORNER_ANGLE_DEG: f64 = 155.0;
    pub const DEFAULT_CORNER_COLOR: Color = Color::RED;
    pub const DEFAULT_TRACE_PALETTE: [Color; 5] = [
        Color::GREEN,
        Color::BLUE,
        Color::YELLOW,
        Color::MAGENTA,
        Color::CYAN,
    ];

    /// The corner threshold in radians.
    #[must_use]
    pub fn corner_angle_rad(&self) -> f64 {
        self.corner_angle_deg.to_radians()
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the corner window is
    /// even or shorter than 3, if the corner angle is not in
    /// `(0, 180]` degrees, or if painting is enabled with an empty
    /// palette.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.corner_window < 3 || self.corner_window % 2 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "corner_window must be odd and at least 3, got {}",
                self.corner_window
            )));
        }
        if !(self.corner_angle_deg > 0.0 && self.corner_angle_deg <= 180.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "corner_angle_deg must be in (0, 180], got {}",
                self.corner_angle_deg
            )));
        }
        if self.paint && self.trace_palette.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "trace_palette must not be empty when painting".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target_color: Self::DEFAULT_TARGET_COLOR,
            corner_window: Self::DEFAULT_CORNER_WINDOW,
            corner_angle_deg: Self::DEFAULT_CORNER_ANGLE_DEG,
            trace_palette: Self::DEFAULT_TRACE_PALETTE.to_vec(),
            corner_color: Self::DEFAULT_CORNER_COLOR,
            paint: true,
        }
    }
}

/// Result of a full tracing run.
///
/// Uses custom `Serialize`/`Deserialize` implementations because
/// `RgbImage` does not implement serde traits. The raster is
/// serialized as a `(width, height, raw_pixels)` tuple.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Contours in discovery (row-major scan) order.
    pub contours: Vec<Contour>,
    /// Corners across all contours, grouped by contour.
    pub corners: Vec<CornerMark>,
    /// The decoded raster, painted when `config.paint` is `true`.
    pub image: RgbImage,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Serde-compatible proxy for `ProcessResult`.
#[derive(Serialize, Deserialize)]
struct ProcessResultProxy {
    contours: Vec<Contour>,
    corners: Vec<CornerMark>,
    image: (u32, u32, Vec<u8>),
    dimensions: Dimensions,
}

impl Serialize for ProcessResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = ProcessResultProxy {
            contours: self.contours.clone(),
            corners: self.corners.clone(),
            image: (
                self.image.width(),
                self.image.height(),
                self.image.as_raw().clone(),
            ),
            dimensions: self.dimensions,
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProcessResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = ProcessResultProxy::deserialize(deserializer)?;
        let image = RgbImage::from_raw(proxy.image.0, proxy.image.1, proxy.image.2)
            .ok_or_else(|| serde::de::Error::custom("invalid RGB image dimensions"))?;
        Ok(Self {
            contours: proxy.contours,
            corners: proxy.corners,
            image,
            dimensions: proxy.dimensions,
        })
    }
}

/// Errors that can occur while tracing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input pixmap.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Configuration is invalid.
    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),

    /// A write addressed a cell outside the grid.
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    /// Growing a contour or the registry failed.
    #[error("failed to grow trace storage: {0}")]
    Allocation(#[from] TryReserveError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Direction;

    // --- Color tests ---

    #[test]
    fn color_equality_is_exact() {
        assert_eq!(Color::new(1, 2, 3), Color::new(1, 2, 3));
        assert_ne!(Color::new(1, 2, 3), Color::new(1, 2, 4));
    }

    #[test]
    fn color_converts_to_and_from_rgb() {
        let rgb: image::Rgb<u8> = Color::new(10, 20, 30).into();
        assert_eq!(rgb, image::Rgb([10, 20, 30]));
        assert_eq!(Color::from(rgb), Color::new(10, 20, 30));
    }

    #[test]
    fn color_parses_triplet() {
        assert_eq!("255,0,10".parse::<Color>().unwrap(), Color::new(255, 0, 10));
        assert_eq!(" 1, 2 ,3 ".parse::<Color>().unwrap(), Color::new(1, 2, 3));
    }

    #[test]
    fn color_rejects_malformed_input() {
        assert!(matches!(
            "1,2".parse::<Color>(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            "1,2,3,4".parse::<Color>(),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            "1,2,256".parse::<Color>(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    // --- Coordinate tests ---

    #[test]
    fn coordinate_step_follows_compass() {
        let c = Coordinate::new(5, 5);
        assert_eq!(c.step(Direction::North), Coordinate::new(5, 4));
        assert_eq!(c.step(Direction::SouthEast), Coordinate::new(6, 6));
        assert_eq!(c.step(Direction::West), Coordinate::new(4, 5));
    }

    #[test]
    fn coordinate_distance() {
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!(a.distance(a).abs() < f64::EPSILON);
    }

    // --- Contour tests ---

    #[test]
    fn contour_accessors() {
        let points = vec![Coordinate::new(1, 1), Coordinate::new(1, 2)];
        let contour = Contour::new(Color::BLACK, points.clone(), Closure::Open);
        assert_eq!(contour.len(), 2);
        assert!(!contour.is_empty());
        assert!(!contour.is_closed());
        assert_eq!(contour.first(), Some(&Coordinate::new(1, 1)));
        assert_eq!(contour.last(), Some(&Coordinate::new(1, 2)));
        assert!(contour.contains(Coordinate::new(1, 2)));
        assert!(!contour.contains(Coordinate::new(2, 2)));
        assert_eq!(contour.into_points(), points);
    }

    // --- TraceConfig tests ---

    #[test]
    fn trace_config_defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.target_color, Color::BLACK);
        assert_eq!(config.corner_window, 7);
        assert!((config.corner_angle_deg - 155.0).abs() < f64::EPSILON);
        assert!((config.corner_angle_rad() - 2.705_260_340_591_211).abs() < 1e-12);
        assert_eq!(config.trace_palette.len(), 5);
        assert_eq!(config.corner_color, Color::RED);
        assert!(config.paint);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trace_config_rejects_even_window() {
        let config = TraceConfig {
            corner_window: 6,
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn trace_config_rejects_angle_out_of_range() {
        for angle in [0.0, -10.0, 180.5, f64::NAN] {
            let config = TraceConfig {
                corner_angle_deg: angle,
                ..TraceConfig::default()
            };
            assert!(config.validate().is_err(), "angle {angle} should be rejected");
        }
    }

    #[test]
    fn trace_config_allows_empty_palette_without_paint() {
        let config = TraceConfig {
            trace_palette: vec![],
            paint: false,
            ..TraceConfig::default()
        };
        assert!(config.validate().is_ok());
        let painting = TraceConfig {
            paint: true,
            ..config
        };
        assert!(painting.validate().is_err());
    }

    #[test]
    fn trace_config_partial_json_uses_defaults() {
        let config: TraceConfig =
            serde_json::from_str(r#"{"corner_window": 9, "paint": false}"#).unwrap();
        assert_eq!(config.corner_window, 9);
        assert!(!config.paint);
        assert_eq!(config.target_color, Color::BLACK);
    }

    // --- PipelineError tests ---

    #[test]
    fn error_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
        let err = PipelineError::OutOfBounds {
            x: 5,
            y: -1,
            width: 5,
            height: 5,
        };
        assert_eq!(err.to_string(), "coordinate (5, -1) is outside the 5x5 grid");
    }

    #[test]
    fn process_result_serde_round_trip() {
        let result = ProcessResult {
            contours: vec![Contour::new(
                Color::BLACK,
                vec![Coordinate::new(0, 0), Coordinate::new(1, 0)],
                Closure::Closed,
            )],
            corners: vec![CornerMark {
                at: Coordinate::new(1, 0),
                contour: 0,
                position: 1,
                angle: 1.5,
            }],
            image: RgbImage::from_pixel(2, 1, image::Rgb([9, 8, 7])),
            dimensions: Dimensions {
                width: 2,
                height: 1,
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: ProcessResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.contours, result.contours);
        assert_eq!(back.corners, result.corners);
        assert_eq!(back.image.as_raw(), result.image.as_raw());
        assert_eq!(back.dimensions, result.dimensions);
    }
}
