use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::detected_face::{BoundingBox, DetectedFace};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::shared::capability::CapabilityError;
use crate::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
};
use crate::shared::decoded_image::DecodedImage;
use crate::shared::model_resolver::{self, ModelResolveError, ModelSource, ProgressFn};

use super::arcface_embedder::ArcFaceEmbedder;
use super::onnx_yolo_detector::OnnxYoloDetector;

/// Fraction of the face box added on each side before embedding.
const CROP_MARGIN: f64 = 0.1;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error(transparent)]
    Resolve(#[from] ModelResolveError),
    #[error("failed to load model {path}: {message}")]
    Session { path: PathBuf, message: String },
}

/// Options for [`OnnxFaceAnalyzer::load`].
pub struct ModelLoadOptions {
    pub detector_confidence: f64,
    /// When set, missing weights are downloaded and progress is reported here.
    pub download: Option<fn(&str) -> ProgressFn>,
}

/// YOLO detection followed by ArcFace description of every detected face.
pub struct OnnxFaceAnalyzer {
    detector: OnnxYoloDetector,
    embedder: ArcFaceEmbedder,
}

impl OnnxFaceAnalyzer {
    pub fn new(detector: OnnxYoloDetector, embedder: ArcFaceEmbedder) -> Self {
        Self { detector, embedder }
    }

    /// Resolve both models under `weights_dir` and open their sessions.
    pub fn load(weights_dir: &Path, options: &ModelLoadOptions) -> Result<Self, ModelLoadError> {
        let detector_path = resolve_model(
            DETECTOR_MODEL_NAME,
            DETECTOR_MODEL_URL,
            weights_dir,
            options,
        )?;
        let embedder_path = resolve_model(
            EMBEDDING_MODEL_NAME,
            EMBEDDING_MODEL_URL,
            weights_dir,
            options,
        )?;

        log::info!("Loading face detector from {}", detector_path.display());
        let detector = OnnxYoloDetector::new(&detector_path, options.detector_confidence)
            .map_err(|e| ModelLoadError::Session {
                path: detector_path.clone(),
                message: e.to_string(),
            })?;
        log::info!("Loading face recognizer from {}", embedder_path.display());
        let embedder =
            ArcFaceEmbedder::new(&embedder_path).map_err(|e| ModelLoadError::Session {
                path: embedder_path.clone(),
                message: e.to_string(),
            })?;

        Ok(Self::new(detector, embedder))
    }
}

fn resolve_model(
    name: &str,
    url: &str,
    weights_dir: &Path,
    options: &ModelLoadOptions,
) -> Result<PathBuf, ModelResolveError> {
    let source = ModelSource { name, url };
    let progress = options.download.map(|make| make(name));
    model_resolver::resolve(&source, weights_dir, progress)
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    fn detect_and_describe(
        &self,
        image: &DecodedImage,
    ) -> Result<Vec<DetectedFace>, CapabilityError> {
        let boxes = self.detector.detect(image)?;
        let mut faces = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let Some(crop) = crop_face(image, &bbox) else {
                continue;
            };
            let descriptor = self.embedder.embed(&crop)?;
            faces.push(DetectedFace { descriptor, bbox });
        }
        Ok(faces)
    }
}

/// Square crop centred on the face box, grown by [`CROP_MARGIN`].
fn crop_face(image: &DecodedImage, bbox: &BoundingBox) -> Option<DecodedImage> {
    let side = bbox.width().max(bbox.height()) * (1.0 + 2.0 * CROP_MARGIN);
    let cx = (bbox.x1 + bbox.x2) / 2.0;
    let cy = (bbox.y1 + bbox.y2) / 2.0;
    let half = side / 2.0;
    image.crop(
        (cx - half).floor() as i64,
        (cy - half).floor() as i64,
        (cx + half).ceil() as i64,
        (cy + half).ceil() as i64,
    )
}
