use thiserror::Error;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::matching::domain::classification::ClassificationResult;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no face found in the reference image; supply a reference image with a clearly visible face")]
pub struct ReferenceFaceNotFound;

/// Scores faces against the descriptors taken from the reference image.
///
/// Built once before any item is processed and shared read-only by every
/// classification worker.
#[derive(Clone, Debug)]
pub struct Matcher {
    references: Vec<FaceDescriptor>,
    threshold: f64,
}

impl Matcher {
    /// Builds a matcher from every face detected in the reference image.
    ///
    /// Each face becomes a reference; a candidate is scored by its distance
    /// to the closest one.
    pub fn from_reference_faces(
        faces: Vec<DetectedFace>,
        threshold: f64,
    ) -> Result<Self, ReferenceFaceNotFound> {
        if faces.is_empty() {
            return Err(ReferenceFaceNotFound);
        }
        Ok(Self {
            references: faces.into_iter().map(|f| f.descriptor).collect(),
            threshold,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Distance from `descriptor` to the closest reference face.
    pub fn best_distance(&self, descriptor: &FaceDescriptor) -> f64 {
        self.references
            .iter()
            .map(|r| r.distance(descriptor))
            .fold(f64::INFINITY, f64::min)
    }

    /// Classifies an image from its detected faces.
    ///
    /// Only the first (most confident) face is considered; further faces in
    /// a group photo are ignored.
    pub fn classify(&self, faces: &[DetectedFace]) -> ClassificationResult {
        match faces.first() {
            None => ClassificationResult::NoFaceDetected,
            Some(face) => {
                ClassificationResult::from_distance(self.best_distance(&face.descriptor), self.threshold)
            }
        }
    }
}
