//! SVG export serializer.
//!
//! Renders traced contours and corner marks as a vector overlay using the
//! [`svg`] crate for document construction, XML escaping, and path data
//! formatting. The `viewBox` matches the source pixel grid, and every
//! coordinate is placed at the center of its cell so the overlay lines up
//! with the raster.
//!
//! Each contour with two or more points becomes a `<path>` element built
//! from `M`/`L` commands and closed with `z` when the trace returned to
//! its start. Each corner becomes a `<circle>`.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and `<metadata>`
//! elements so exported files carry their provenance.
//!
//! This is a pure function with no I/O. It returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Title};
use svg::node::{Node, Text, Value};

use contrace_pipeline::{Color, Contour, Coordinate, CornerMark, Dimensions, TraceConfig};

/// Namespace URI for the embedded `<contrace:config>` element.
const CONFIG_NAMESPACE: &str = "https://contrace.invalid/ns/1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source file name without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`TraceConfig`] JSON, emitted inside a `<metadata>`
    /// element wrapped in a namespaced `<contrace:config>` element.
    pub config_json: Option<&'a str>,
}

/// Colors and sizes used when drawing the overlay.
#[derive(Debug, Clone)]
pub struct SvgStyle<'a> {
    /// Stroke colors cycled through per contour.
    pub palette: &'a [Color],
    /// Fill color of corner circles.
    pub corner_color: Color,
    /// Radius of corner circles in pixels.
    pub corner_radius: f64,
    /// Contour stroke width in pixels.
    pub stroke_width: f64,
}

impl Default for SvgStyle<'_> {
    fn default() -> Self {
        Self {
            palette: &TraceConfig::DEFAULT_TRACE_PALETTE,
            corner_color: TraceConfig::DEFAULT_CORNER_COLOR,
            corner_radius: 0.5,
            stroke_width: 0.25,
        }
    }
}

/// Center of the cell at `at` in SVG user units.
#[allow(clippy::cast_precision_loss)]
fn cell_center(at: Coordinate) -> (f64, f64) {
    (at.x as f64 + 0.5, at.y as f64 + 0.5)
}

/// CSS color string for `color`.
fn css_color(color: Color) -> String {
    format!("rgb({},{},{})", color.r, color.g, color.b)
}

/// Build an SVG path `d` attribute string from a contour.
///
/// Uses `M` for the first point and `L` for subsequent points, with a
/// trailing `z` when the contour is closed. Returns an empty string for
/// contours with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use contrace_pipeline::{Closure, Color, Contour, Coordinate};
/// use contrace_export::svg::build_path_data;
///
/// let contour = Contour::new(
///     Color::BLACK,
///     vec![Coordinate::new(1, 2), Coordinate::new(3, 4)],
///     Closure::Open,
/// );
/// assert_eq!(build_path_data(&contour), "M1.5,2.5 L3.5,4.5");
/// ```
#[must_use]
pub fn build_path_data(contour: &Contour) -> String {
    let points = contour.points();
    if points.len() < 2 {
        return String::new();
    }

    let mut data = Data::new().move_to(cell_center(points[0]));
    for &p in &points[1..] {
        data = data.line_to(cell_center(p));
    }
    if contour.is_closed() {
        data = data.close();
    }
    String::from(Value::from(data))
}

/// Serialize contours and corners into an SVG document with the default
/// style and no metadata.
#[must_use]
pub fn to_svg(contours: &[Contour], corners: &[CornerMark], dimensions: Dimensions) -> String {
    to_svg_with(
        contours,
        corners,
        dimensions,
        &SvgStyle::default(),
        &SvgMetadata::default(),
    )
}

/// Serialize contours and corners into an SVG document string.
///
/// Contours are drawn first, grouped under `<g id="contours">`, with
/// contour `i` stroked in `style.palette[i % len]` (black when the
/// palette is empty). Corners follow under `<g id="corners">` so they
/// render on top.
///
/// # Examples
///
/// ```
/// use contrace_pipeline::{Closure, Color, Contour, Coordinate, Dimensions};
/// use contrace_export::svg::{SvgMetadata, SvgStyle, to_svg_with};
///
/// let contours = vec![Contour::new(
///     Color::BLACK,
///     vec![Coordinate::new(0, 0), Coordinate::new(0, 1)],
///     Closure::Open,
/// )];
/// let metadata = SvgMetadata {
///     title: Some("square"),
///     ..SvgMetadata::default()
/// };
/// let dims = Dimensions { width: 4, height: 4 };
/// let svg = to_svg_with(&contours, &[], dims, &SvgStyle::default(), &metadata);
/// assert!(svg.contains("<title>square</title>"));
/// assert!(svg.contains("M0.5,0.5 L0.5,1.5"));
/// ```
#[must_use]
pub fn to_svg_with(
    contours: &[Contour],
    corners: &[CornerMark],
    dimensions: Dimensions,
    style: &SvgStyle<'_>,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("contrace:config");
        config_el.assign("xmlns:contrace", CONFIG_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    let mut paths = Group::new().set("id", "contours");
    let mut any_path = false;
    for (index, contour) in contours.iter().enumerate() {
        let d = build_path_data(contour);
        if d.is_empty() {
            continue;
        }
        let stroke = if style.palette.is_empty() {
            Color::BLACK
        } else {
            style.palette[index % style.palette.len()]
        };
        paths = paths.add(
            Path::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", css_color(stroke))
                .set("stroke-width", style.stroke_width),
        );
        any_path = true;
    }
    if any_path {
        doc = doc.add(paths);
    }

    if !corners.is_empty() {
        let mut marks = Group::new().set("id", "corners");
        for corner in corners {
            let (cx, cy) = cell_center(corner.at);
            marks = marks.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", style.corner_radius)
                    .set("fill", css_color(style.corner_color)),
            );
        }
        doc = doc.add(marks);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
