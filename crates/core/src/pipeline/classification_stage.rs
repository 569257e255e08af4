use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::matching::domain::classification::ClassificationResult;
use crate::matching::domain::matcher::Matcher;
use crate::pipeline::classification_scheduler::ClassifyFn;
use crate::pipeline::errors::SortError;
use crate::shared::capability::CapabilityError;
use crate::sorting::domain::dispatch_pair::SortDirectories;

/// Decode → detect → describe → score, for the reference and for items.
pub struct ClassificationStage {
    decoder: Arc<dyn ImageDecoder>,
    analyzer: Arc<dyn FaceAnalyzer>,
}

impl ClassificationStage {
    pub fn new(decoder: Arc<dyn ImageDecoder>, analyzer: Arc<dyn FaceAnalyzer>) -> Self {
        Self { decoder, analyzer }
    }

    /// Builds the matcher from every face in the reference image.
    ///
    /// Fails with `ReferenceFaceNotFound` when the image has no face, and
    /// with `ReferenceUnreadable` when it cannot be decoded or analysed.
    pub fn build_matcher(&self, reference: &Path, threshold: f64) -> Result<Matcher, SortError> {
        let faces = self
            .decoder
            .decode(reference)
            .and_then(|image| self.analyzer.detect_and_describe(&image))
            .map_err(|source| SortError::ReferenceUnreadable {
                path: reference.to_path_buf(),
                source,
            })?;
        log::debug!(
            "Reference image {} has {} face(s)",
            reference.display(),
            faces.len()
        );
        Ok(Matcher::from_reference_faces(faces, threshold)?)
    }

    pub fn classify(
        &self,
        matcher: &Matcher,
        path: &Path,
    ) -> Result<ClassificationResult, CapabilityError> {
        let image = self.decoder.decode(path)?;
        let faces = self.analyzer.detect_and_describe(&image)?;
        Ok(matcher.classify(&faces))
    }

    /// Per-item classification call for the scheduler. Items are file
    /// names inside the input directory.
    pub fn classifier(self: &Arc<Self>, matcher: Arc<Matcher>, dirs: &SortDirectories) -> ClassifyFn {
        let stage = Arc::clone(self);
        let dirs = dirs.clone();
        Arc::new(move |item: &str| stage.classify(&matcher, &dirs.input_path(item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::StubImages;
    use std::path::PathBuf;

    fn stage(images: StubImages) -> Arc<ClassificationStage> {
        let (decoder, analyzer) = images.build();
        Arc::new(ClassificationStage::new(decoder, analyzer))
    }

    #[test]
    fn test_build_matcher_from_reference() {
        let stage = stage(StubImages::new().with_faces("ref.jpg", vec![vec![1.0, 0.0]]));

        let matcher = stage.build_matcher(Path::new("ref.jpg"), 0.5).unwrap();

        assert_eq!(matcher.reference_count(), 1);
        assert_eq!(matcher.threshold(), 0.5);
    }

    #[test]
    fn test_reference_without_face_is_distinct_error() {
        let stage = stage(StubImages::new().with_faces("ref.jpg", vec![]));

        let err = stage.build_matcher(Path::new("ref.jpg"), 0.5).unwrap_err();

        assert!(matches!(err, SortError::ReferenceFaceNotFound(_)));
    }

    #[test]
    fn test_undecodable_reference_is_unreadable() {
        let stage = stage(StubImages::new());

        let err = stage.build_matcher(Path::new("missing.jpg"), 0.5).unwrap_err();

        assert!(matches!(
            err,
            SortError::ReferenceUnreadable { ref path, .. } if path == &PathBuf::from("missing.jpg")
        ));
    }

    #[test]
    fn test_classifier_scores_items_in_input_dir() {
        let stage = stage(
            StubImages::new()
                .with_faces("ref.jpg", vec![vec![1.0, 0.0]])
                .with_faces("same.jpg", vec![vec![2.0, 0.0]])
                .with_faces("other.jpg", vec![vec![0.0, 1.0]])
                .with_faces("empty.jpg", vec![])
                .failing("broken.jpg"),
        );
        let matcher = Arc::new(stage.build_matcher(Path::new("ref.jpg"), 0.5).unwrap());
        let classify = stage.classifier(matcher, &SortDirectories::new("photos", "m", "n"));

        assert!(matches!(
            classify("same.jpg").unwrap(),
            ClassificationResult::Matched { .. }
        ));
        assert!(matches!(
            classify("other.jpg").unwrap(),
            ClassificationResult::NotMatched { .. }
        ));
        assert_eq!(
            classify("empty.jpg").unwrap(),
            ClassificationResult::NoFaceDetected
        );
        assert!(classify("broken.jpg").is_err());
    }
}
