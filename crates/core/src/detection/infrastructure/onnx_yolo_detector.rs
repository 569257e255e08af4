/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference and NMS post-processing.
/// Produces face boxes only; identity comes from the embedder.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::detected_face::BoundingBox;
use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;

use super::math::nms;
use super::session_factory::{open_session, runtime_error};

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// YOLO face detector backed by an ONNX Runtime session.
pub struct OnnxYoloDetector {
    session: Mutex<ort::session::Session>,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = open_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session: Mutex::new(session),
            confidence,
            input_size,
        })
    }

    /// Detect faces, most confident first, in source-image coordinates.
    pub fn detect(&self, image: &DecodedImage) -> Result<Vec<BoundingBox>, CapabilityError> {
        if image.is_empty() {
            return Ok(Vec::new());
        }

        let (tensor, geometry) = letterbox(image, self.input_size);
        let input_value = ort::value::Tensor::from_array(tensor).map_err(runtime_error)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(runtime_error)?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(runtime_error)?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let candidates = decode_candidates(
            data,
            &shape,
            self.confidence,
            &geometry,
            image.width(),
            image.height(),
        )?;
        Ok(nms(candidates, NMS_IOU_THRESH))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Mapping from letterboxed model coordinates back to the source image.
struct LetterboxGeometry {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

/// Letterbox-resize an image to `target_size` × `target_size` NCHW float32.
fn letterbox(image: &DecodedImage, target_size: u32) -> (ndarray::Array4<f32>, LetterboxGeometry) {
    let fw = image.width() as f64;
    let fh = image.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padding is 114/255 gray, the YOLO convention.
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        LetterboxGeometry {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parse raw YOLO rows `[cx, cy, w, h, conf, ...]` into clamped boxes.
///
/// The output tensor is either `[1, features, detections]` (transposed) or
/// `[1, detections, features]`; both are handled.
fn decode_candidates(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    geometry: &LetterboxGeometry,
    image_w: u32,
    image_h: u32,
) -> Result<Vec<BoundingBox>, CapabilityError> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(format!("YOLO output too small for shape {shape:?}").into());
    }

    let value = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let scale = geometry.scale;
    let pad_x = geometry.pad_x as f64;
    let pad_y = geometry.pad_y as f64;
    let max_x = image_w as f64;
    let max_y = image_h as f64;

    let mut boxes = Vec::new();
    for i in 0..num_dets {
        let score = value(i, 4);
        if score < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        let bbox = BoundingBox {
            x1: (((cx - w / 2.0) - pad_x) / scale).clamp(0.0, max_x),
            y1: (((cy - h / 2.0) - pad_y) / scale).clamp(0.0, max_y),
            x2: (((cx + w / 2.0) - pad_x) / scale).clamp(0.0, max_x),
            y2: (((cy + h / 2.0) - pad_y) / scale).clamp(0.0, max_y),
            score,
        };
        if bbox.width() > 0.0 && bbox.height() > 0.0 {
            boxes.push(bbox);
        }
    }
    Ok(boxes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn image(w: u32, h: u32, value: u8) -> DecodedImage {
        DecodedImage::new(vec![value; (w * h * 3) as usize], w, h)
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640: scale 3.2, content 640x320, pad_y 160
        let (tensor, geometry) = letterbox(&image(200, 100, 128), 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(geometry.scale, 3.2, epsilon = 0.01);
        assert_eq!(geometry.pad_x, 0);
        assert_eq!(geometry.pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let (tensor, geometry) = letterbox(&image(100, 50, 255), 640);

        let y = geometry.pad_y as usize + 1;
        let x = geometry.pad_x as usize + 1;
        assert_relative_eq!(tensor[[0, 0, y, x]], 1.0, epsilon = 0.01);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 114.0 / 255.0, epsilon = 0.01);
    }

    fn identity_letterbox() -> LetterboxGeometry {
        LetterboxGeometry {
            scale: 1.0,
            pad_x: 0,
            pad_y: 0,
        }
    }

    #[test]
    fn test_decode_rows_layout() {
        // [1, 6 detections, 5 features]; only the first row passes
        let mut data = vec![0.0f32; 6 * 5];
        data[..5].copy_from_slice(&[50.0, 50.0, 20.0, 20.0, 0.9]);
        data[5..10].copy_from_slice(&[10.0, 10.0, 4.0, 4.0, 0.1]);
        let boxes =
            decode_candidates(&data, &[1, 6, 5], 0.5, &identity_letterbox(), 100, 100).unwrap();

        assert_eq!(boxes.len(), 1);
        assert_relative_eq!(boxes[0].x1, 40.0);
        assert_relative_eq!(boxes[0].y2, 60.0);
        assert_relative_eq!(boxes[0].score, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_transposed_layout() {
        // [1, 5 features, 6 detections]; only detection 2 passes
        let num_dets = 6;
        let mut data = vec![0.0f32; 5 * num_dets];
        let row = [30.0, 40.0, 10.0, 10.0, 0.8];
        for (f, v) in row.iter().enumerate() {
            data[f * num_dets + 2] = *v;
        }
        let boxes =
            decode_candidates(&data, &[1, 5, 6], 0.5, &identity_letterbox(), 100, 100).unwrap();

        assert_eq!(boxes.len(), 1);
        assert_relative_eq!(boxes[0].x1, 25.0);
        assert_relative_eq!(boxes[0].y1, 35.0);
    }

    #[test]
    fn test_decode_clamps_to_image() {
        let mut data = vec![0.0f32; 6 * 5];
        data[..5].copy_from_slice(&[2.0, 2.0, 20.0, 20.0, 0.9]);
        let boxes =
            decode_candidates(&data, &[1, 6, 5], 0.5, &identity_letterbox(), 10, 10).unwrap();

        assert_relative_eq!(boxes[0].x1, 0.0);
        assert_relative_eq!(boxes[0].x2, 10.0);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let data = vec![0.0; 10];
        assert!(decode_candidates(&data, &[10], 0.5, &identity_letterbox(), 10, 10).is_err());
        assert!(decode_candidates(&data, &[1, 5, 4], 0.5, &identity_letterbox(), 10, 10).is_err());
    }
}
