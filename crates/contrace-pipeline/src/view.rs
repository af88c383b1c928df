//! Heading-relative neighborhoods.

use crate::direction::Direction;
use crate::grid::{PixelGrid, Sample};
use crate::types::Coordinate;

/// The eight neighbors of a focal cell, indexed relative to a heading.
///
/// Local north is straight ahead, local east is to the right, and so on
/// clockwise. Rebuilt at every tracing step and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedView {
    heading: Direction,
    samples: [Sample; 8],
}

impl OrientedView {
    /// Sample the neighbors of `at` as seen while travelling `heading`.
    #[must_use]
    pub fn new<G: PixelGrid + ?Sized>(grid: &G, at: Coordinate, heading: Direction) -> Self {
        let samples = std::array::from_fn(|local| {
            let global = Direction::from_index(local).to_global(heading);
            grid.sample(at.step(global))
        });
        Self { heading, samples }
    }

    /// The heading the view is rotated to.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// The neighbor in heading-relative direction `local`.
    #[must_use]
    pub const fn local(&self, local: Direction) -> Sample {
        self.samples[local.index()]
    }

    /// Convert a heading-relative direction to a compass direction.
    #[must_use]
    pub const fn to_global(&self, local: Direction) -> Direction {
        local.to_global(self.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;
    use image::RgbImage;

    #[test]
    fn north_heading_is_unrotated() {
        let grid = RgbImage::new(3, 3);
        let center = Coordinate::new(1, 1);
        let view = OrientedView::new(&grid, center, Direction::North);
        for d in Direction::ALL {
            assert_eq!(view.local(d).coordinate(), Some(center.step(d)));
        }
    }

    #[test]
    fn west_heading_puts_north_on_the_right() {
        let grid = RgbImage::new(3, 3);
        let center = Coordinate::new(1, 1);
        let view = OrientedView::new(&grid, center, Direction::West);
        assert_eq!(view.heading(), Direction::West);
        assert_eq!(view.local(Direction::North).coordinate(), Some(Coordinate::new(0, 1)));
        assert_eq!(view.local(Direction::East).coordinate(), Some(Coordinate::new(1, 0)));
        assert_eq!(view.local(Direction::South).coordinate(), Some(Coordinate::new(2, 1)));
        assert_eq!(view.to_global(Direction::NorthEast), Direction::NorthWest);
    }

    #[test]
    fn off_grid_neighbors_are_absent() {
        let grid = RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        let view = OrientedView::new(&grid, Coordinate::new(0, 0), Direction::North);
        assert_eq!(view.local(Direction::North), Sample::Absent);
        assert_eq!(view.local(Direction::West), Sample::Absent);
        assert!(view.local(Direction::East).matches(Color::new(1, 2, 3)));
        assert!(view.local(Direction::SouthEast).matches(Color::new(1, 2, 3)));
    }
}
