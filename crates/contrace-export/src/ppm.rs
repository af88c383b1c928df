//! ASCII pixmap (`P3`) serializer.
//!
//! Writes the header `P3`, the width and height, the maximum sample value
//! `255`, then one whitespace-separated RGB triple per pixel in row-major
//! order. The output decodes back through
//! [`contrace_pipeline::decode::decode_pixmap`].

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::ExportError;

/// Encode `image` as ASCII `P3` bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder rejects the raster.
pub fn to_ppm(image: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let encoder =
        PnmEncoder::new(&mut buf).with_subtype(PnmSubtype::Pixmap(SampleEncoding::Ascii));
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
