//! 履歴用サムネイル（長辺を縮小したJPEGのData URL）

use crate::analyzer::EncodedImage;
use crate::error::{CoffeeAiError, Result};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub fn make_thumbnail(image: &[u8], max_size: u32) -> Result<String> {
    let img = image::load_from_memory(image)
        .map_err(|e| CoffeeAiError::ImageLoad(e.to_string()))?;

    // JPEGはアルファ非対応なのでRGBにする
    let thumb = DynamicImage::ImageRgb8(img.thumbnail(max_size, max_size).to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| CoffeeAiError::ImageLoad(e.to_string()))?;

    Ok(EncodedImage::from_bytes(buf.get_ref(), "image/jpeg").to_data_url())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{GenericImageView, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, image::Rgba([30, 120, 40, 255])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_thumbnail_is_downscaled_jpeg() {
        let thumb = make_thumbnail(&png_bytes(640, 320), 160).unwrap();
        assert!(thumb.starts_with("data:image/jpeg;base64,"));

        let data = STANDARD.decode(thumb.trim_start_matches("data:image/jpeg;base64,")).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (160, 80));
    }

    #[test]
    fn test_thumbnail_invalid_image() {
        let result = make_thumbnail(b"not an image", 160);
        assert!(matches!(result, Err(CoffeeAiError::ImageLoad(_))));
    }
}
