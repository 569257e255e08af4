use ndarray::ArrayView3;

/// A decoded still image: contiguous RGB bytes in row-major order.
///
/// Decoding happens behind the `ImageDecoder` port; detection code only
/// sees this buffer and never touches files or codecs.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl DecodedImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `[height, width, 3]` view over the pixel bytes.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, 3),
            &self.data,
        )
        .expect("image data length must match dimensions")
    }

    /// Copies the pixels inside `[x1, y1, x2, y2)` into a new image.
    ///
    /// Coordinates are clamped to the image bounds. Returns `None` when the
    /// clamped box has no area.
    pub fn crop(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Option<DecodedImage> {
        let w = self.width as i64;
        let h = self.height as i64;
        let x1 = x1.clamp(0, w);
        let y1 = y1.clamp(0, h);
        let x2 = x2.clamp(0, w);
        let y2 = y2.clamp(0, h);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        let crop_w = (x2 - x1) as usize;
        let crop_h = (y2 - y1) as usize;
        let stride = self.width as usize * 3;
        let mut out = Vec::with_capacity(crop_w * crop_h * 3);
        for row in y1 as usize..y2 as usize {
            let start = row * stride + x1 as usize * 3;
            out.extend_from_slice(&self.data[start..start + crop_w * 3]);
        }
        Some(DecodedImage::new(out, crop_w as u32, crop_h as u32))
    }
}
