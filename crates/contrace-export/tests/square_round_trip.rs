//! Integration test: run a small pixmap through the full pipeline and
//! export both the painted raster and the SVG overlay.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use contrace_pipeline::{Color, Coordinate, PixelGrid, TraceConfig};

/// 5x5 white grid with a centered 3x3 black square.
const SQUARE: &str = "P3
5 5
255
255 255 255  255 255 255  255 255 255  255 255 255  255 255 255
255 255 255    0   0   0    0   0   0    0   0   0  255 255 255
255 255 255    0   0   0    0   0   0    0   0   0  255 255 255
255 255 255    0   0   0    0   0   0    0   0   0  255 255 255
255 255 255  255 255 255  255 255 255  255 255 255  255 255 255
";

#[test]
fn square_pipeline_to_ppm_and_svg() {
    let result = contrace_pipeline::process(SQUARE.as_bytes(), &TraceConfig::default())
        .expect("pipeline should succeed");

    assert_eq!(result.contours.len(), 1);
    assert_eq!(result.contours[0].len(), 8);
    assert!(result.contours[0].is_closed());
    assert_eq!(result.corners.len(), 1);

    // Painted raster survives a P3 round trip.
    let ppm = contrace_export::to_ppm(&result.image).unwrap();
    assert!(ppm.starts_with(b"P3"));
    let reread = contrace_pipeline::decode::decode_pixmap(&ppm).unwrap();
    assert_eq!(reread, result.image);
    assert_eq!(reread.get(Coordinate::new(1, 1)), Some(Color::GREEN));
    assert_eq!(reread.get(Coordinate::new(2, 3)), Some(Color::RED));
    assert_eq!(reread.get(Coordinate::new(2, 2)), Some(Color::BLACK));

    let svg = contrace_export::to_svg(&result.contours, &result.corners, result.dimensions);
    assert!(svg.contains("<svg"));
    assert_eq!(svg.matches("<path").count(), 1);
    assert_eq!(svg.matches("<circle").count(), 1);
    assert!(svg.contains(r#"viewBox="0 0 5 5""#));
}

#[test]
fn unpainted_output_matches_input() {
    let config = TraceConfig {
        paint: false,
        ..TraceConfig::default()
    };
    let result = contrace_pipeline::process(SQUARE.as_bytes(), &config).unwrap();
    let ppm = contrace_export::to_ppm(&result.image).unwrap();
    let original = contrace_pipeline::decode::decode_pixmap(SQUARE.as_bytes()).unwrap();
    assert_eq!(contrace_pipeline::decode::decode_pixmap(&ppm).unwrap(), original);
}
