use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::detection::infrastructure::onnx_face_analyzer::ModelLoadError;
use crate::matching::domain::matcher::ReferenceFaceNotFound;
use crate::pipeline::pipeline_config::ConfigError;
use crate::shared::capability::CapabilityError;
use crate::sorting::domain::file_action::ActionMode;

/// Errors that abort a run before any item is processed.
#[derive(Error, Debug)]
pub enum SortError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to load face models: {0}")]
    ModelLoadFailure(#[from] ModelLoadError),
    #[error(transparent)]
    ReferenceFaceNotFound(#[from] ReferenceFaceNotFound),
    #[error("failed to analyse reference image {path}: {source}")]
    ReferenceUnreadable {
        path: PathBuf,
        #[source]
        source: CapabilityError,
    },
    #[error("cannot read input directory {path}: {source}")]
    DirectoryListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-item failures. Logged and counted; the batch carries on.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("failed to classify '{item}': {source}")]
    Classification {
        item: String,
        #[source]
        source: CapabilityError,
    },
    #[error("classification of '{item}' timed out after {}s", .after.as_secs_f64())]
    Timeout { item: String, after: Duration },
    #[error("failed to {mode} '{item}' from {from} to {to}: {source}")]
    Action {
        item: String,
        mode: ActionMode,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ItemError {
    pub fn item(&self) -> &str {
        match self {
            ItemError::Classification { item, .. }
            | ItemError::Timeout { item, .. }
            | ItemError::Action { item, .. } => item,
        }
    }

    /// True for failures of the classification step (including timeouts).
    pub fn is_classification_failure(&self) -> bool {
        !matches!(self, ItemError::Action { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_accessor() {
        let err = ItemError::Timeout {
            item: "a.jpg".into(),
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.item(), "a.jpg");
        assert!(err.is_classification_failure());
        assert_eq!(err.to_string(), "classification of 'a.jpg' timed out after 1.5s");
    }

    #[test]
    fn test_action_error_message_names_paths() {
        let err = ItemError::Action {
            item: "b.jpg".into(),
            mode: ActionMode::Copy,
            from: PathBuf::from("in/b.jpg"),
            to: PathBuf::from("out/b.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let message = err.to_string();
        assert!(message.contains("copy 'b.jpg'"));
        assert!(message.contains("out/b.jpg"));
        assert!(!err.is_classification_failure());
    }

    #[test]
    fn test_reference_not_found_is_distinct() {
        let err: SortError = ReferenceFaceNotFound.into();
        assert!(matches!(err, SortError::ReferenceFaceNotFound(_)));
        assert!(err.to_string().contains("reference image"));
    }
}
