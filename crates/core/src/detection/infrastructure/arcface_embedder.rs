/// ArcFace face embedder using ONNX Runtime.
///
/// Turns a face crop into an identity descriptor; two crops of the same
/// person land close together under cosine distance.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;

use super::session_factory::{open_session, runtime_error};

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct ArcFaceEmbedder {
    session: Mutex<ort::session::Session>,
}

impl ArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: Mutex::new(open_session(model_path)?),
        })
    }

    pub fn embed(&self, crop: &DecodedImage) -> Result<FaceDescriptor, CapabilityError> {
        if crop.is_empty() {
            return Err("cannot embed an empty face crop".into());
        }
        let tensor = preprocess(crop);
        let input_value = ort::value::Tensor::from_array(tensor).map_err(runtime_error)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(runtime_error)?;
        let embedding_array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(runtime_error)?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        Ok(FaceDescriptor::new(embedding_slice.to_vec()))
    }
}

/// Resize crop to 112x112, normalize, NCHW layout.
fn preprocess(crop: &DecodedImage) -> ndarray::Array4<f32> {
    let src = crop.as_ndarray();
    let src_w = crop.width() as usize;
    let src_h = crop.height() as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}
