//! Pixmap decoding.
//!
//! Accepts the textual `P3` pixmap format (and the other PNM variants the
//! `image` crate understands) and produces an 8-bit RGB raster.
//!
//! This is the first step in the pipeline: raw bytes in, `RgbImage` out.

use image::{ImageFormat, RgbImage};

use crate::types::PipelineError;

/// Decode PNM bytes into an RGB raster.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the header is malformed or
/// the pixel data is truncated or out of range.
#[must_use = "returns the decoded raster"]
pub fn decode_pixmap(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory_with_format(bytes, ImageFormat::Pnm)?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        let result = decode_pixmap(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn garbage_returns_image_decode_error() {
        let result = decode_pixmap(b"hello world");
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn truncated_pixel_data_is_rejected() {
        let result = decode_pixmap(b"P3\n2 1\n255\n0 0 0\n");
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn ascii_pixmap_decodes_row_major() {
        let text = b"P3\n2 2\n255\n\
            255 0 0  0 255 0\n\
            0 0 255  10 20 30\n";
        let img = decode_pixmap(text).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn whitespace_layout_does_not_matter() {
        let text = b"P3 1 2 255 1 2 3 4 5 6";
        let img = decode_pixmap(text).unwrap();
        assert_eq!(img.get_pixel(0, 1).0, [4, 5, 6]);
    }
}
