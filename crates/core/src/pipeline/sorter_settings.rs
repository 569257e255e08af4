use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::pipeline_config::{
    ConfigError, ItemFailurePolicy, ListingFailurePolicy, PipelineConfig,
};
use crate::shared::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_DETECTOR_CONFIDENCE, DEFAULT_ITEM_TIMEOUT_SECS,
    DEFAULT_MATCH_THRESHOLD,
};
use crate::sorting::domain::dispatch_pair::SortDirectories;
use crate::sorting::domain::file_action::ActionMode;

pub const DEFAULT_REFERENCE: &str = "./reference.jpg";
pub const DEFAULT_INPUT_DIR: &str = "./input";
pub const DEFAULT_MATCH_DIR: &str = "./output/match";
pub const DEFAULT_NO_MATCH_DIR: &str = "./output/no_match";
pub const DEFAULT_WEIGHTS_DIR: &str = "./weights";

/// Layered run settings, as read from a JSON file or collected from flags.
///
/// Every field is optional; [`SorterSettings::overlay`] lets a higher
/// layer (the command line) win over a lower one (the settings file), and
/// the accessors fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SorterSettings {
    pub reference: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub match_dir: Option<PathBuf>,
    pub no_match_dir: Option<PathBuf>,
    pub weights_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub threshold: Option<f64>,
    /// Seconds; 0 disables the per-item deadline.
    pub item_timeout_secs: Option<u64>,
    pub on_error: Option<ItemFailurePolicy>,
    pub mode: Option<ActionMode>,
    pub allow_unreadable_input: Option<bool>,
    pub extensions: Option<Vec<String>>,
    pub detector_confidence: Option<f64>,
    pub download_models: Option<bool>,
}

impl SorterSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `top` replace the ones in `self`.
    pub fn overlay(self, top: SorterSettings) -> SorterSettings {
        SorterSettings {
            reference: top.reference.or(self.reference),
            input_dir: top.input_dir.or(self.input_dir),
            match_dir: top.match_dir.or(self.match_dir),
            no_match_dir: top.no_match_dir.or(self.no_match_dir),
            weights_dir: top.weights_dir.or(self.weights_dir),
            concurrency: top.concurrency.or(self.concurrency),
            threshold: top.threshold.or(self.threshold),
            item_timeout_secs: top.item_timeout_secs.or(self.item_timeout_secs),
            on_error: top.on_error.or(self.on_error),
            mode: top.mode.or(self.mode),
            allow_unreadable_input: top.allow_unreadable_input.or(self.allow_unreadable_input),
            extensions: top.extensions.or(self.extensions),
            detector_confidence: top.detector_confidence.or(self.detector_confidence),
            download_models: top.download_models.or(self.download_models),
        }
    }

    pub fn reference(&self) -> PathBuf {
        self.reference
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REFERENCE))
    }

    pub fn weights_dir(&self) -> PathBuf {
        self.weights_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WEIGHTS_DIR))
    }

    pub fn detector_confidence(&self) -> f64 {
        self.detector_confidence
            .unwrap_or(DEFAULT_DETECTOR_CONFIDENCE)
    }

    pub fn download_models(&self) -> bool {
        self.download_models.unwrap_or(false)
    }

    /// Resolve into a validated [`PipelineConfig`].
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let directories = SortDirectories::new(
            self.input_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            self.match_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MATCH_DIR)),
            self.no_match_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NO_MATCH_DIR)),
        );
        let concurrency = NonZeroUsize::new(self.concurrency.unwrap_or(DEFAULT_CONCURRENCY))
            .ok_or(ConfigError::ZeroConcurrency)?;
        let item_timeout = match self.item_timeout_secs.unwrap_or(DEFAULT_ITEM_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let listing_policy = if self.allow_unreadable_input.unwrap_or(false) {
            ListingFailurePolicy::TreatAsEmpty
        } else {
            ListingFailurePolicy::Fail
        };

        let config = PipelineConfig::new(directories)
            .with_concurrency(concurrency)
            .with_threshold(self.threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD))
            .with_item_timeout(item_timeout)
            .with_failure_policy(self.on_error.unwrap_or_default())
            .with_action_mode(self.mode.unwrap_or_default())
            .with_listing_policy(listing_policy)
            .with_extensions(self.extensions.clone());
        config.validate()?;
        Ok(config)
    }
}
