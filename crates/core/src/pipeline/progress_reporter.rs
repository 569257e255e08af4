use std::time::Duration;

use crate::pipeline::errors::ItemError;
use crate::pipeline::run_summary::RunSummary;

/// Observer for sort-run progress.
///
/// Decouples the dispatch pipeline from where progress ends up (log
/// output, a UI, a test recorder). All calls come from the coordinating
/// thread, in completion order.
pub trait ProgressReporter: Send {
    /// An item finished classification. `elapsed` is measured from the
    /// start of the run.
    fn item_processed(&mut self, item: &str, elapsed: Duration);

    /// An item's classification or file action failed.
    fn item_failed(&mut self, error: &ItemError);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Every item has been processed and its action scheduled. Called once.
    fn done(&mut self);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self, _summary: &RunSummary) {}
}

/// Silent reporter that discards all events.
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn item_processed(&mut self, _item: &str, _elapsed: Duration) {}
    fn item_failed(&mut self, _error: &ItemError) {}
    fn info(&mut self, _message: &str) {}
    fn done(&mut self) {}
}

/// CLI reporter writing through the `log` facade.
///
/// Keeps the per-item timings so the summary can report throughput.
#[derive(Default)]
pub struct LogProgressReporter {
    processed: Vec<(String, Duration)>,
    failures: usize,
    messages: Vec<String>,
    finished: bool,
}

impl LogProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> &[(String, Duration)] {
        &self.processed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the formatted summary, or `None` if nothing was processed.
    pub fn summary_string(&self, summary: &RunSummary) -> Option<String> {
        if summary.total() == 0 {
            return None;
        }

        let secs = summary.elapsed.as_secs_f64();
        let mut lines = vec![format!(
            "Sort summary ({} images, {secs:.1}s total):",
            summary.total()
        )];
        lines.push(format!("  matched     : {}", summary.matched()));
        lines.push(format!("  not matched : {}", summary.not_matched()));
        lines.push(format!("  no face     : {}", summary.no_face()));
        lines.push(format!(
            "  failed      : {} ({} timed out)",
            summary.classification_failures() + summary.timeouts(),
            summary.timeouts()
        ));
        lines.push(format!(
            "  files       : {} written, {} left in place, {} failed",
            summary.actions_performed,
            summary.actions_skipped,
            summary.action_failures()
        ));
        if secs > 0.0 {
            lines.push(format!(
                "  Throughput: {:.2} images/s",
                summary.total() as f64 / secs
            ));
        }
        Some(lines.join("\n"))
    }
}

impl ProgressReporter for LogProgressReporter {
    fn item_processed(&mut self, item: &str, elapsed: Duration) {
        log::info!(
            "Image '{item}' processed after '{:.2}' seconds",
            elapsed.as_secs_f64()
        );
        self.processed.push((item.to_string(), elapsed));
    }

    fn item_failed(&mut self, error: &ItemError) {
        self.failures += 1;
        log::warn!("{error}");
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn done(&mut self) {
        self.finished = true;
        log::info!("done");
    }

    fn summary(&self, summary: &RunSummary) {
        if let Some(text) = self.summary_string(summary) {
            log::info!("\n\n{text}");
        }
    }
}
