use std::io::Cursor;

use image::{ImageFormat, ImageReader};

/// Longest edge of generated thumbnails, in pixels.
pub const THUMBNAIL_SIZE: u32 = 400;

/// Decode an already-validated image and render a JPEG thumbnail.
///
/// `thumbnail()` preserves aspect ratio, fitting within THUMBNAIL_SIZE square.
pub fn make_thumbnail(data: &[u8]) -> Result<Vec<u8>, String> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?;

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    // JPEG has no alpha channel
    let thumbnail_img = img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).into_rgb8();

    let mut buf = Cursor::new(Vec::new());
    thumbnail_img
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to encode thumbnail: {}", e))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_thumbnail_fits_bounds() {
        let thumb = make_thumbnail(&png_bytes(1200, 600)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (400, 200));
    }

    #[test]
    fn test_small_image_not_upscaled_past_bounds() {
        let thumb = make_thumbnail(&png_bytes(40, 30)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w <= THUMBNAIL_SIZE && h <= THUMBNAIL_SIZE);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(make_thumbnail(b"definitely not an image").is_err());
    }
}
