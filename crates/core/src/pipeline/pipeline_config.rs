use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_MATCH_THRESHOLD,
};
use crate::sorting::domain::dispatch_pair::SortDirectories;
use crate::sorting::domain::file_action::ActionMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("match threshold must be a finite number greater than 0, got {0}")]
    InvalidThreshold(f64),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("item timeout must be greater than zero (omit it to disable)")]
    ZeroTimeout,
    #[error("match and no-match directories must differ, both are {0}")]
    SameOutputDirectories(PathBuf),
    #[error("unknown {kind} '{value}', expected one of: {expected}")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What happens to an item whose classification failed or timed out.
///
/// Neither choice can produce a match: a failed item never lands in the
/// match directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemFailurePolicy {
    /// Leave the file where it is.
    #[default]
    #[serde(rename = "skip")]
    Skip,
    #[serde(rename = "no-match")]
    RouteToNoMatch,
}

impl FromStr for ItemFailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "no-match" => Ok(Self::RouteToNoMatch),
            other => Err(ConfigError::UnknownValue {
                kind: "failure policy",
                value: other.to_string(),
                expected: "skip, no-match",
            }),
        }
    }
}

impl fmt::Display for ItemFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::RouteToNoMatch => write!(f, "no-match"),
        }
    }
}

impl FromStr for ActionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "move" => Ok(Self::Move),
            other => Err(ConfigError::UnknownValue {
                kind: "action mode",
                value: other.to_string(),
                expected: "copy, move",
            }),
        }
    }
}

/// What happens when the input directory cannot be listed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListingFailurePolicy {
    /// Abort the run with `DirectoryListUnreadable`.
    #[default]
    Fail,
    /// Log a warning and process zero items.
    TreatAsEmpty,
}

/// Immutable settings for one sort run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub directories: SortDirectories,
    pub concurrency: NonZeroUsize,
    pub threshold: f64,
    pub item_timeout: Option<Duration>,
    pub failure_policy: ItemFailurePolicy,
    pub action_mode: ActionMode,
    pub listing_policy: ListingFailurePolicy,
    /// File extensions to pick up; `None` means the built-in image list.
    pub extensions: Option<Vec<String>>,
}

impl PipelineConfig {
    pub fn new(directories: SortDirectories) -> Self {
        Self {
            directories,
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            threshold: DEFAULT_MATCH_THRESHOLD,
            item_timeout: Some(Duration::from_secs(DEFAULT_ITEM_TIMEOUT_SECS)),
            failure_policy: ItemFailurePolicy::default(),
            action_mode: ActionMode::default(),
            listing_policy: ListingFailurePolicy::default(),
            extensions: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: ItemFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_action_mode(mut self, mode: ActionMode) -> Self {
        self.action_mode = mode;
        self
    }

    pub fn with_listing_policy(mut self, policy: ListingFailurePolicy) -> Self {
        self.listing_policy = policy;
        self
    }

    pub fn with_extensions(mut self, extensions: Option<Vec<String>>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.item_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.directories.matched == self.directories.unmatched {
            return Err(ConfigError::SameOutputDirectories(
                self.directories.matched.clone(),
            ));
        }
        Ok(())
    }
}
