//! Ownership of every traced contour.

use std::collections::TryReserveError;

use crate::types::{Contour, Coordinate, PipelineError};

/// Capacity reserved by the registry on its first append.
pub const INITIAL_CONTOUR_CAPACITY: usize = 1024;

/// Append `item`, doubling the capacity first when `items` is full.
///
/// The first growth reserves `initial_capacity`. Allocation failure is
/// returned instead of aborting.
pub(crate) fn push_doubling<T>(
    items: &mut Vec<T>,
    item: T,
    initial_capacity: usize,
) -> Result<(), TryReserveError> {
    if items.len() == items.capacity() {
        let additional = items.capacity().max(initial_capacity).max(1);
        items.try_reserve_exact(additional)?;
    }
    items.push(item);
    Ok(())
}

/// Insertion-ordered collection of discovered contours.
///
/// Contours are immutable once appended; the registry hands out only
/// shared references until it is consumed.
#[derive(Debug, Clone, Default)]
pub struct TraceRegistry {
    contours: Vec<Contour>,
}

impl TraceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contours: Vec::new(),
        }
    }

    /// Store a finished contour. Amortized O(1).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Allocation`] if the backing storage
    /// cannot grow.
    pub fn append(&mut self, contour: Contour) -> Result<(), PipelineError> {
        push_doubling(&mut self.contours, contour, INITIAL_CONTOUR_CAPACITY)?;
        Ok(())
    }

    /// Returns `true` if any stored contour contains `at`.
    ///
    /// Linear in the total number of stored coordinates.
    #[must_use]
    pub fn is_traced(&self, at: Coordinate) -> bool {
        self.contours.iter().any(|c| c.contains(at))
    }

    /// Number of stored contours.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.contours.len()
    }

    /// Returns `true` if no contour has been stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// All contours in insertion order.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Iterate contours in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    /// Total coordinates across all contours.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Consumes the registry and returns its contours.
    #[must_use]
    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }
}

impl<'a> IntoIterator for &'a TraceRegistry {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
