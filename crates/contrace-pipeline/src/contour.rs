//! Contour tracing: walk the boundary of a target-colored region.
//!
//! The tracer is a wall follower. At every step it looks at the
//! neighborhood of the current cell rotated to the current heading and
//! takes the first admissible neighbor in a fixed right-to-left order:
//!
//! ```text
//!   4   3   2
//!   5   C   1
//!   6   #   X
//! ```
//!
//! `C` is the current cell and `#` the cell it came from. Turning around
//! is never considered, so a one-pixel-wide line cannot bounce back and
//! forth forever. `X` is skipped because the admissibility rule that led
//! to `C` already saw it. A neighbor is admissible when it has the target
//! color and passes [`oriented_border_check`] for the direction that
//! reaches it.

use std::collections::HashSet;

use crate::border::{classify, oriented_border_check};
use crate::direction::Direction;
use crate::grid::{PixelGrid, Sample};
use crate::registry::{TraceRegistry, push_doubling};
use crate::types::{Closure, Color, Contour, Coordinate, PipelineError};
use crate::view::OrientedView;

/// Capacity reserved by a contour on its first growth.
pub const INITIAL_POINT_CAPACITY: usize = 64;

/// Heading-relative candidates in priority order.
const LOCAL_CANDIDATES: [Direction; 6] = [
    Direction::East,
    Direction::NorthEast,
    Direction::North,
    Direction::NorthWest,
    Direction::West,
    Direction::SouthWest,
];

/// Outcome of a single tracing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved onto a new cell, now heading in the given direction.
    Moved(Coordinate, Direction),
    /// The next cell was the start; the loop is closed.
    Closed,
    /// No admissible neighbor; the contour ends open.
    Stuck,
    /// The next move would repeat an earlier (cell, heading) state, so
    /// the walk loops without ever reaching the start.
    Cycled,
}

/// State machine that traces one contour.
///
/// Created on a border cell with the heading reported by
/// [`classify`]; driven with [`step`](Self::step) or run to completion
/// with [`run`](Self::run).
pub struct ContourTracer<'g, G: PixelGrid + ?Sized> {
    grid: &'g G,
    target: Color,
    start: Coordinate,
    current: Coordinate,
    heading: Option<Direction>,
    points: Vec<Coordinate>,
    // The next move depends only on (cell, heading).
    visited: HashSet<(Coordinate, Direction)>,
    outcome: Option<Step>,
}

impl<'g, G: PixelGrid + ?Sized> ContourTracer<'g, G> {
    /// Begin a trace at `start`, which is recorded as the first point.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the point buffer cannot
    /// be allocated.
    pub fn new(
        grid: &'g G,
        start: Coordinate,
        heading: Direction,
        target: Color,
    ) -> Result<Self, PipelineError> {
        let mut points = Vec::new();
        push_doubling(&mut points, start, INITIAL_POINT_CAPACITY)?;
        let mut visited = HashSet::new();
        visited.try_reserve(INITIAL_POINT_CAPACITY)?;
        visited.insert((start, heading));
        Ok(Self {
            grid,
            target,
            start,
            current: start,
            heading: Some(heading),
            points,
            visited,
            outcome: None,
        })
    }

    /// The cell the tracer currently stands on.
    #[must_use]
    pub const fn current(&self) -> Coordinate {
        self.current
    }

    /// The current heading, `None` once the trace has stopped.
    #[must_use]
    pub const fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Points recorded so far, start first.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Pick the next cell from the heading-relative neighborhood of the
    /// current cell. Returns the cell and the compass direction used to
    /// reach it.
    fn pick_next(&self, heading: Direction) -> Option<(Coordinate, Direction)> {
        let view = OrientedView::new(self.grid, self.current, heading);
        LOCAL_CANDIDATES.iter().find_map(|&local| {
            let global = view.to_global(local);
            match view.local(local) {
                Sample::Present { at, color }
                    if color == self.target
                        && oriented_border_check(self.grid, at, self.target, global) =>
                {
                    Some((at, global))
                }
                _ => None,
            }
        })
    }

    fn stop(&mut self, outcome: Step) -> Step {
        self.heading = None;
        self.outcome = Some(outcome);
        outcome
    }

    /// Advance the trace by one cell.
    ///
    /// Once the trace has stopped, further calls return the same terminal
    /// [`Step`] without moving.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the point or state
    /// buffers cannot grow.
    pub fn step(&mut self) -> Result<Step, PipelineError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        let Some(heading) = self.heading else {
            return Ok(self.stop(Step::Stuck));
        };

        let Some((next, direction)) = self.pick_next(heading) else {
            return Ok(self.stop(Step::Stuck));
        };

        if next == self.start {
            self.current = next;
            return Ok(self.stop(Step::Closed));
        }

        self.visited.try_reserve(1)?;
        if !self.visited.insert((next, direction)) {
            return Ok(self.stop(Step::Cycled));
        }

        push_doubling(&mut self.points, next, INITIAL_POINT_CAPACITY)?;
        self.current = next;
        self.heading = Some(direction);
        Ok(Step::Moved(next, direction))
    }

    /// Run the trace until it closes, gets stuck, or starts repeating.
    ///
    /// A cycled contour holds the walk up to, but not including, the
    /// first repeated state, so no loop is stored twice.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the point or state
    /// buffers cannot grow.
    pub fn run(mut self) -> Result<Contour, PipelineError> {
        let closure = loop {
            match self.step()? {
                Step::Moved(..) => {}
                Step::Closed => break Closure::Closed,
                Step::Stuck => break Closure::Open,
                Step::Cycled => {
                    tracing::warn!(
                        start_x = self.start.x,
                        start_y = self.start.y,
                        len = self.points.len(),
                        "trace loops without returning to its start; stopping"
                    );
                    break Closure::Cycled;
                }
            }
        };
        Ok(Contour::new(self.target, self.points, closure))
    }
}

/// Trace a single contour starting at `start` with `heading`.
///
/// # Errors
///
/// Returns [`PipelineError::Allocation`] if the point buffer cannot grow.
pub fn trace_from<G: PixelGrid + ?Sized>(
    grid: &G,
    start: Coordinate,
    heading: Direction,
    target: Color,
) -> Result<Contour, PipelineError> {
    ContourTracer::new(grid, start, heading, target)?.run()
}

/// Scan `grid` row-major and trace every border of `target` that is not
/// already covered by a contour.
///
/// The grid is only read; painting happens in later stages.
///
/// # Errors
///
/// Returns [`PipelineError::Allocation`] if contour or registry storage
/// cannot grow. The scan stops at the first failure.
pub fn trace_contours<G: PixelGrid + ?Sized>(
    grid: &G,
    target: Color,
) -> Result<TraceRegistry, PipelineError> {
    let mut registry = TraceRegistry::new();

    for y in 0..i64::from(grid.height()) {
        for x in 0..i64::from(grid.width()) {
            let at = Coordinate::new(x, y);
            let Some(heading) = classify(grid, at, target) else {
                continue;
            };
            if registry.is_traced(at) {
                continue;
            }

            let contour = trace_from(grid, at, heading, target)?;
            tracing::debug!(
                index = registry.len(),
                x,
                y,
                ?heading,
                len = contour.len(),
                closure = ?contour.closure(),
                "traced contour"
            );
            registry.append(contour)?;
        }
    }

    Ok(registry)
}
