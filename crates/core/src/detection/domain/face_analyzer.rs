use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;

/// Domain interface for detecting faces and describing each one.
///
/// Faces are returned most-confident first. An empty vector means no face
/// was found, which is not an error. Implementations are shared by all
/// classification workers, so they must be usable through `&self`.
pub trait FaceAnalyzer: Send + Sync {
    fn detect_and_describe(&self, image: &DecodedImage)
        -> Result<Vec<DetectedFace>, CapabilityError>;
}
