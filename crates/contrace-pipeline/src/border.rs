//! Border classification: which cells start a trace, and which cells the
//! tracer may step onto.

use crate::direction::Direction;
use crate::grid::PixelGrid;
use crate::types::{Color, Coordinate};

/// Decide whether `at` is a border cell of `target` and, if so, which
/// heading to start tracing with.
///
/// The axis neighbors are tested in the order north, south, east, west;
/// the first one that is in the grid and not `target` decides the
/// heading:
///
/// | differing neighbor | heading |
/// |--------------------|---------|
/// | north              | west    |
/// | south              | east    |
/// | east               | north   |
/// | west               | south   |
///
/// Returns `None` if `at` is off the grid, is not `target`, or has no
/// differing in-grid axis neighbor.
#[must_use]
pub fn classify<G: PixelGrid + ?Sized>(grid: &G, at: Coordinate, target: Color) -> Option<Direction> {
    if grid.get(at)? != target {
        return None;
    }

    [
        (Direction::North, Direction::West),
        (Direction::South, Direction::East),
        (Direction::East, Direction::North),
        (Direction::West, Direction::South),
    ]
    .into_iter()
    .find(|&(neighbor, _)| grid.sample(at.step(neighbor)).differs_from(target))
    .map(|(_, heading)| heading)
}

/// Admissibility test for a cell reached by travelling in `approach`.
///
/// The cell must be `target`, and at least one of the three cells on the
/// right-hand side of the travel direction (forward-right diagonal,
/// right, behind-right diagonal) must be in the grid and not `target`.
#[must_use]
pub fn oriented_border_check<G: PixelGrid + ?Sized>(
    grid: &G,
    at: Coordinate,
    target: Color,
    approach: Direction,
) -> bool {
    if grid.get(at) != Some(target) {
        return false;
    }

    (1..=3).any(|eighths| {
        grid.sample(at.step(approach.rotated(eighths)))
            .differs_from(target)
    })
}
