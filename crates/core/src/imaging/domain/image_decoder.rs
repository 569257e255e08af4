use std::path::Path;

use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;

/// Domain interface for turning an image file into RGB pixels.
///
/// Injected into the classification stage so detection never depends on
/// process-wide codec state. Shared across worker threads, hence `&self`.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedImage, CapabilityError>;
}
