//! Compass directions and the eighth-turn arithmetic the tracer uses.
//!
//! Directions are numbered clockwise from north, with north pointing
//! toward decreasing `y` (image rows grow downward). "No direction" is
//! expressed as `Option<Direction>::None` by callers.

use serde::{Deserialize, Serialize};

/// One of the eight compass directions of an 8-connected grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Clockwise position of this direction, north = 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction at clockwise position `index % 8`.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    /// Rotate clockwise by `eighths` eighth-turns (45° each).
    #[must_use]
    pub const fn rotated(self, eighths: usize) -> Self {
        Self::from_index(self.index() + eighths)
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.rotated(4)
    }

    /// Interpret `self` as a direction relative to `heading` (where local
    /// north is straight ahead) and return the corresponding global
    /// direction.
    #[must_use]
    pub const fn to_global(self, heading: Self) -> Self {
        self.rotated(heading.index())
    }

    /// Grid offset `(dx, dy)` of one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }
}
