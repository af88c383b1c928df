//! Pixel grid access.
//!
//! The tracer only ever sees a raster through [`PixelGrid`]: bounded
//! color reads and writes addressed by [`Coordinate`]. Reads outside the
//! grid are not errors; they produce [`Sample::Absent`], which every
//! caller treats as "candidate rejected".

use image::RgbImage;

use crate::types::{Color, Coordinate, PipelineError};

/// Bounded read/write access to the colors of a 2D grid.
pub trait PixelGrid {
    /// Grid width in cells.
    fn width(&self) -> u32;

    /// Grid height in cells.
    fn height(&self) -> u32;

    /// The color at `at`, or `None` when `at` is outside the grid.
    fn get(&self, at: Coordinate) -> Option<Color>;

    /// Overwrite the color at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::OutOfBounds`] if `at` is outside the grid.
    fn set(&mut self, at: Coordinate, color: Color) -> Result<(), PipelineError>;

    /// Returns `true` if `at` lies within `[0, width) × [0, height)`.
    fn contains(&self, at: Coordinate) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < i64::from(self.width()) && at.y < i64::from(self.height())
    }

    /// Sample the cell at `at`.
    fn sample(&self, at: Coordinate) -> Sample {
        self.get(at)
            .map_or(Sample::Absent, |color| Sample::Present { at, color })
    }
}

/// The outcome of reading one cell: either a located color or nothing,
/// because the cell lies off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// The cell exists and has this color.
    Present { at: Coordinate, color: Color },
    /// The cell is outside the grid.
    Absent,
}

impl Sample {
    /// The sampled coordinate, if present.
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match *self {
            Self::Present { at, .. } => Some(at),
            Self::Absent => None,
        }
    }

    /// Returns `true` if the cell exists and has exactly `target` color.
    #[must_use]
    pub fn matches(&self, target: Color) -> bool {
        matches!(*self, Self::Present { color, .. } if color == target)
    }

    /// Returns `true` if the cell exists and has a color other than
    /// `target`. Absent cells never differ.
    #[must_use]
    pub fn differs_from(&self, target: Color) -> bool {
        matches!(*self, Self::Present { color, .. } if color != target)
    }
}

/// Convert a coordinate into in-grid pixel indices.
fn pixel_index(grid: &impl PixelGrid, at: Coordinate) -> Option<(u32, u32)> {
    if !grid.contains(at) {
        return None;
    }
    Some((u32::try_from(at.x).ok()?, u32::try_from(at.y).ok()?))
}

impl PixelGrid for RgbImage {
    fn width(&self) -> u32 {
        Self::width(self)
    }

    fn height(&self) -> u32 {
        Self::height(self)
    }

    fn get(&self, at: Coordinate) -> Option<Color> {
        let (x, y) = pixel_index(self, at)?;
        self.get_pixel_checked(x, y).map(|p| Color::from(*p))
    }

    fn set(&mut self, at: Coordinate, color: Color) -> Result<(), PipelineError> {
        let out_of_bounds = PipelineError::OutOfBounds {
            x: at.x,
            y: at.y,
            width: Self::width(self),
            height: Self::height(self),
        };
        let (x, y) = pixel_index(self, at).ok_or(out_of_bounds)?;
        self.put_pixel(x, y, color.into());
        Ok(())
    }
}
