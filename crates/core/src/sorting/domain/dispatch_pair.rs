use std::path::{Path, PathBuf};

use crate::matching::domain::classification::RoutingDecision;

/// The three directories a sort run reads from and writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortDirectories {
    pub input: PathBuf,
    pub matched: PathBuf,
    pub unmatched: PathBuf,
}

impl SortDirectories {
    pub fn new(
        input: impl Into<PathBuf>,
        matched: impl Into<PathBuf>,
        unmatched: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            matched: matched.into(),
            unmatched: unmatched.into(),
        }
    }

    pub fn input_path(&self, item: &str) -> PathBuf {
        self.input.join(item)
    }

    pub fn output_dir(&self, decision: RoutingDecision) -> &Path {
        match decision {
            RoutingDecision::ToMatchDir => &self.matched,
            RoutingDecision::ToNoMatchDir => &self.unmatched,
        }
    }
}

/// Resolved source and destination for one item.
///
/// A pair without a destination is a no-op for the file action; it is what
/// a skipped item resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchPair {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
}

impl DispatchPair {
    pub fn resolve(dirs: &SortDirectories, item: &str, decision: RoutingDecision) -> Self {
        Self {
            source: dirs.input_path(item),
            destination: Some(dirs.output_dir(decision).join(item)),
        }
    }

    pub fn skip(dirs: &SortDirectories, item: &str) -> Self {
        Self {
            source: dirs.input_path(item),
            destination: None,
        }
    }

    /// Both paths present and non-empty.
    pub fn is_actionable(&self) -> bool {
        !self.source.as_os_str().is_empty()
            && self
                .destination
                .as_ref()
                .is_some_and(|d| !d.as_os_str().is_empty())
    }
}
