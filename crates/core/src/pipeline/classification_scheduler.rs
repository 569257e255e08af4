use std::sync::Arc;

use crate::matching::domain::classification::ClassificationResult;
use crate::pipeline::errors::ItemError;
use crate::shared::capability::CapabilityError;

/// Per-item classification call, shared by every worker.
pub type ClassifyFn =
    Arc<dyn Fn(&str) -> Result<ClassificationResult, CapabilityError> + Send + Sync>;

/// One item leaving the classification stage.
#[derive(Debug)]
pub struct Completion {
    /// Position of the item in the input list.
    pub index: usize,
    pub item: String,
    pub outcome: Result<ClassificationResult, ItemError>,
}

/// Abstracts how classification calls are scheduled.
///
/// This is a port. Implementations must invoke `on_complete` exactly once
/// per item, on the calling thread, with the outcome that item's own call
/// produced. Completion order is unspecified.
pub trait ClassificationScheduler: Send + Sync {
    fn run(
        &self,
        items: Vec<String>,
        classify: ClassifyFn,
        on_complete: &mut dyn FnMut(Completion),
    );
}
