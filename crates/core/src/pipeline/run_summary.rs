use std::time::Duration;

use crate::matching::domain::classification::ClassificationResult;
use crate::pipeline::errors::ItemError;
use crate::sorting::domain::dispatch_pair::DispatchPair;

/// What happened to one item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemRecord {
    /// Position in the listed input.
    pub index: usize,
    pub item: String,
    /// `None` when classification failed or timed out.
    pub classification: Option<ClassificationResult>,
    pub pair: DispatchPair,
}

/// Outcome of one sort run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One record per item, in input order.
    pub records: Vec<ItemRecord>,
    /// Per-item failures, classification and action alike.
    pub failures: Vec<ItemError>,
    pub actions_performed: usize,
    pub actions_skipped: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn matched(&self) -> usize {
        self.count(|c| matches!(c, ClassificationResult::Matched { .. }))
    }

    pub fn not_matched(&self) -> usize {
        self.count(|c| matches!(c, ClassificationResult::NotMatched { .. }))
    }

    pub fn no_face(&self) -> usize {
        self.count(|c| matches!(c, ClassificationResult::NoFaceDetected))
    }

    pub fn classification_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, ItemError::Classification { .. }))
            .count()
    }

    pub fn timeouts(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, ItemError::Timeout { .. }))
            .count()
    }

    pub fn action_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, ItemError::Action { .. }))
            .count()
    }

    pub fn record(&self, item: &str) -> Option<&ItemRecord> {
        self.records.iter().find(|r| r.item == item)
    }

    fn count(&self, pred: impl Fn(&ClassificationResult) -> bool) -> usize {
        self.records
            .iter()
            .filter(|r| r.classification.as_ref().is_some_and(&pred))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorting::domain::dispatch_pair::SortDirectories;

    fn record(index: usize, classification: Option<ClassificationResult>) -> ItemRecord {
        let dirs = SortDirectories::new("in", "m", "n");
        let item = format!("{index}.jpg");
        ItemRecord {
            index,
            pair: DispatchPair::skip(&dirs, &item),
            item,
            classification,
        }
    }

    #[test]
    fn test_counts_by_outcome() {
        let summary = RunSummary {
            records: vec![
                record(0, Some(ClassificationResult::Matched { distance: 0.1 })),
                record(1, Some(ClassificationResult::NotMatched { distance: 0.9 })),
                record(2, Some(ClassificationResult::NoFaceDetected)),
                record(3, None),
                record(4, None),
            ],
            failures: vec![
                ItemError::Classification {
                    item: "3.jpg".into(),
                    source: "broken".into(),
                },
                ItemError::Timeout {
                    item: "4.jpg".into(),
                    after: Duration::from_secs(1),
                },
            ],
            ..Default::default()
        };

        assert_eq!(summary.total(), 5);
        assert_eq!(summary.matched(), 1);
        assert_eq!(summary.not_matched(), 1);
        assert_eq!(summary.no_face(), 1);
        assert_eq!(summary.classification_failures(), 1);
        assert_eq!(summary.timeouts(), 1);
        assert_eq!(summary.action_failures(), 0);
        assert_eq!(summary.record("3.jpg").unwrap().classification, None);
    }
}
