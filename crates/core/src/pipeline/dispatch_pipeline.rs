use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::matching::domain::classification::RoutingDecision;
use crate::pipeline::classification_scheduler::{ClassificationScheduler, ClassifyFn, Completion};
use crate::pipeline::errors::ItemError;
use crate::pipeline::pipeline_config::{ItemFailurePolicy, PipelineConfig};
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::pipeline::run_summary::{ItemRecord, RunSummary};
use crate::sorting::domain::dispatch_pair::{DispatchPair, SortDirectories};
use crate::sorting::domain::file_action::{ActionMode, ActionOutcome, FileAction};

/// Runs every item through classification and hands each resolved pair to
/// the file action.
///
/// Layout: `scheduler (≤ N in flight) → coordinator → action thread`
///
/// The coordinator reports progress for each item as it completes, turns
/// the outcome into a [`DispatchPair`] for that same item, and queues it for
/// the action thread. Once every item has been queued it reports `done`.
pub struct DispatchPipeline {
    scheduler: Box<dyn ClassificationScheduler>,
    action: Arc<dyn FileAction>,
    directories: SortDirectories,
    failure_policy: ItemFailurePolicy,
    action_mode: ActionMode,
}

#[derive(Default)]
struct ActionTally {
    performed: usize,
    skipped: usize,
    failures: Vec<ItemError>,
}

impl DispatchPipeline {
    pub fn new(
        scheduler: Box<dyn ClassificationScheduler>,
        action: Arc<dyn FileAction>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            scheduler,
            action,
            directories: config.directories.clone(),
            failure_policy: config.failure_policy,
            action_mode: config.action_mode,
        }
    }

    pub fn run(
        &self,
        items: Vec<String>,
        classify: ClassifyFn,
        reporter: &mut dyn ProgressReporter,
    ) -> RunSummary {
        let started = Instant::now();
        let (action_tx, action_rx) = crossbeam_channel::unbounded::<(String, DispatchPair)>();
        let action_handle = spawn_action_executor(self.action.clone(), self.action_mode, action_rx);

        let mut records = Vec::with_capacity(items.len());
        let mut failures = Vec::new();

        self.scheduler.run(items, classify, &mut |completion: Completion| {
            reporter.item_processed(&completion.item, started.elapsed());

            let (classification, pair) = match completion.outcome {
                Ok(result) => {
                    log::debug!("{}: {result}", completion.item);
                    let pair =
                        DispatchPair::resolve(&self.directories, &completion.item, result.routing());
                    (Some(result), pair)
                }
                Err(error) => {
                    reporter.item_failed(&error);
                    failures.push(error);
                    (None, self.failed_pair(&completion.item))
                }
            };

            if action_tx.send((completion.item.clone(), pair.clone())).is_err() {
                log::error!("File action worker stopped; '{}' was not dispatched", completion.item);
            }
            records.push(ItemRecord {
                index: completion.index,
                item: completion.item,
                classification,
                pair,
            });
        });

        // Every item is queued; actions may still be running.
        drop(action_tx);
        reporter.done();

        let tally = match action_handle.join() {
            Ok(tally) => tally,
            Err(_) => {
                log::error!("File action worker panicked");
                ActionTally::default()
            }
        };
        for failure in &tally.failures {
            reporter.item_failed(failure);
        }
        failures.extend(tally.failures);
        records.sort_by_key(|r| r.index);

        RunSummary {
            records,
            failures,
            actions_performed: tally.performed,
            actions_skipped: tally.skipped,
            elapsed: started.elapsed(),
        }
    }

    fn failed_pair(&self, item: &str) -> DispatchPair {
        match self.failure_policy {
            ItemFailurePolicy::Skip => DispatchPair::skip(&self.directories, item),
            ItemFailurePolicy::RouteToNoMatch => {
                DispatchPair::resolve(&self.directories, item, RoutingDecision::ToNoMatchDir)
            }
        }
    }
}

/// Applies the file action to each queued pair in arrival order.
fn spawn_action_executor(
    action: Arc<dyn FileAction>,
    mode: ActionMode,
    action_rx: crossbeam_channel::Receiver<(String, DispatchPair)>,
) -> JoinHandle<ActionTally> {
    std::thread::spawn(move || {
        let mut tally = ActionTally::default();
        for (item, pair) in action_rx {
            match action.execute(&pair) {
                Ok(ActionOutcome::Performed) => tally.performed += 1,
                Ok(ActionOutcome::Skipped) => tally.skipped += 1,
                Err(source) => tally.failures.push(ItemError::Action {
                    item,
                    mode,
                    from: pair.source,
                    to: pair.destination.unwrap_or_default(),
                    source,
                }),
            }
        }
        tally
    })
}
