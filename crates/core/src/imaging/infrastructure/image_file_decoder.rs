use std::path::Path;

use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;

/// Decodes still images with the pure-Rust `image` crate.
///
/// Any alpha channel is dropped and grayscale is expanded to RGB.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileDecoder;

impl ImageFileDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, CapabilityError> {
        let reader = image::ImageReader::open(path)?.with_guessed_format()?;
        let rgb = reader.decode()?.into_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("{} has no pixels", path.display()).into());
        }
        Ok(DecodedImage::new(rgb.into_raw(), width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decodes_png_to_rgb() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("red.png");
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 0, 0]));
        img.save(&path).unwrap();

        let decoded = ImageFileDecoder::new().decode(&path).unwrap();

        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 3);
        assert_eq!(&decoded.data()[..3], &[255, 0, 0]);
    }

    #[test]
    fn test_drops_alpha_channel() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rgba.png");
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 40]));
        img.save(&path).unwrap();

        let decoded = ImageFileDecoder::new().decode(&path).unwrap();

        assert_eq!(decoded.data().len(), 2 * 2 * 3);
        assert_eq!(&decoded.data()[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = ImageFileDecoder::new().decode(&tmp.path().join("nope.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_bytes_are_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(ImageFileDecoder::new().decode(&path).is_err());
    }
}
