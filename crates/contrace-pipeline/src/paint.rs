//! Visualization: paint traced contours and corner marks into the grid.
//!
//! Painting runs only after tracing has finished, so recolored cells
//! can never influence border classification.

use crate::grid::PixelGrid;
use crate::types::{Color, Contour, CornerMark, PipelineError};

/// Paint contour `i` with `palette[i % palette.len()]`.
///
/// Returns the number of cells written. An empty palette paints nothing.
///
/// # Errors
///
/// Returns [`PipelineError::OutOfBounds`] if a contour point lies outside
/// the grid (contours traced from a different grid).
pub fn paint_contours<'a, G, I>(grid: &mut G, contours: I, palette: &[Color]) -> Result<usize, PipelineError>
where
    G: PixelGrid + ?Sized,
    I: IntoIterator<Item = &'a Contour>,
{
    if palette.is_empty() {
        return Ok(0);
    }

    let mut written = 0;
    for (contour, &color) in contours.into_iter().zip(palette.iter().cycle()) {
        for &at in contour.points() {
            grid.set(at, color)?;
        }
        written += contour.len();
    }
    Ok(written)
}

/// Paint every corner mark with `color`. Returns the number of cells
/// written.
///
/// # Errors
///
/// Returns [`PipelineError::OutOfBounds`] if a mark lies outside the grid.
pub fn paint_corners<G: PixelGrid + ?Sized>(
    grid: &mut G,
    corners: &[CornerMark],
    color: Color,
) -> Result<usize, PipelineError> {
    for mark in corners {
        grid.set(mark.at, color)?;
    }
    Ok(corners.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Closure, Coordinate};
    use image::RgbImage;

    fn contour(points: &[(i64, i64)]) -> Contour {
        Contour::new(
            Color::BLACK,
            points.iter().map(|&(x, y)| Coordinate::new(x, y)).collect(),
            Closure::Open,
        )
    }

    #[test]
    fn palette_cycles_per_contour() {
        let mut grid = RgbImage::new(4, 1);
        let contours: Vec<Contour> = (0..4).map(|x| contour(&[(x, 0)])).collect();
        let palette = [Color::GREEN, Color::BLUE, Color::YELLOW];
        let written = paint_contours(&mut grid, &contours, &palette).unwrap();
        assert_eq!(written, 4);
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(Color::GREEN));
        assert_eq!(grid.get(Coordinate::new(1, 0)), Some(Color::BLUE));
        assert_eq!(grid.get(Coordinate::new(2, 0)), Some(Color::YELLOW));
        assert_eq!(grid.get(Coordinate::new(3, 0)), Some(Color::GREEN));
    }

    #[test]
    fn empty_palette_paints_nothing() {
        let mut grid = RgbImage::new(2, 1);
        let contours = [contour(&[(0, 0), (1, 0)])];
        assert_eq!(paint_contours(&mut grid, &contours, &[]).unwrap(), 0);
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(Color::BLACK));
    }

    #[test]
    fn corners_overwrite_contour_color() {
        let mut grid = RgbImage::new(3, 1);
        let contours = [contour(&[(0, 0), (1, 0), (2, 0)])];
        paint_contours(&mut grid, &contours, &[Color::GREEN]).unwrap();
        let marks = [CornerMark {
            at: Coordinate::new(1, 0),
            contour: 0,
            position: 1,
            angle: 1.0,
        }];
        assert_eq!(paint_corners(&mut grid, &marks, Color::RED).unwrap(), 1);
        assert_eq!(grid.get(Coordinate::new(0, 0)), Some(Color::GREEN));
        assert_eq!(grid.get(Coordinate::new(1, 0)), Some(Color::RED));
    }

    #[test]
    fn foreign_contour_is_rejected() {
        let mut grid = RgbImage::new(2, 2);
        let contours = [contour(&[(5, 5)])];
        let result = paint_contours(&mut grid, &contours, &[Color::GREEN]);
        assert!(matches!(result, Err(PipelineError::OutOfBounds { .. })));
    }
}
