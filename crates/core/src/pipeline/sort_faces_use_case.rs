use std::path::Path;
use std::sync::Arc;

use crate::pipeline::classification_scheduler::ClassificationScheduler;
use crate::pipeline::classification_stage::ClassificationStage;
use crate::pipeline::dispatch_pipeline::DispatchPipeline;
use crate::pipeline::errors::SortError;
use crate::pipeline::pipeline_config::{ListingFailurePolicy, PipelineConfig};
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::pipeline::run_summary::RunSummary;
use crate::sorting::domain::directory_lister::DirectoryLister;
use crate::sorting::domain::file_action::FileAction;

/// Sorts the images of the input directory into match / no-match folders
/// by comparing their faces with a reference image.
///
/// The matcher is built before anything is listed or copied, so a bad
/// reference aborts the run with no file touched.
pub struct SortFacesUseCase {
    config: PipelineConfig,
    stage: Arc<ClassificationStage>,
    lister: Box<dyn DirectoryLister>,
    pipeline: DispatchPipeline,
}

impl SortFacesUseCase {
    pub fn new(
        config: PipelineConfig,
        stage: ClassificationStage,
        lister: Box<dyn DirectoryLister>,
        action: Arc<dyn FileAction>,
        scheduler: Box<dyn ClassificationScheduler>,
    ) -> Result<Self, SortError> {
        config.validate()?;
        let pipeline = DispatchPipeline::new(scheduler, action, &config);
        Ok(Self {
            config,
            stage: Arc::new(stage),
            lister,
            pipeline,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn execute(
        &self,
        reference: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<RunSummary, SortError> {
        let matcher = self.stage.build_matcher(reference, self.config.threshold)?;
        reporter.info(&format!(
            "Matcher for reference image '{}' created.",
            reference.display()
        ));

        let items = self.list_items()?;
        reporter.info(&format!(
            "Sorting {} image(s) from {} with {} worker(s)",
            items.len(),
            self.config.directories.input.display(),
            self.config.concurrency
        ));

        let classify = self
            .stage
            .classifier(Arc::new(matcher), &self.config.directories);
        let summary = self.pipeline.run(items, classify, reporter);
        reporter.summary(&summary);
        Ok(summary)
    }

    fn list_items(&self) -> Result<Vec<String>, SortError> {
        let input = &self.config.directories.input;
        match self.lister.list(input) {
            Ok(items) => Ok(items),
            Err(source) => match self.config.listing_policy {
                ListingFailurePolicy::Fail => Err(SortError::DirectoryListUnreadable {
                    path: input.clone(),
                    source,
                }),
                ListingFailurePolicy::TreatAsEmpty => {
                    log::warn!(
                        "Cannot read input directory {}: {source}; nothing to sort",
                        input.display()
                    );
                    Ok(Vec::new())
                }
            },
        }
    }
}
