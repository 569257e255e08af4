use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sorting::domain::dispatch_pair::DispatchPair;

/// How files reach their output directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    /// Leave the source in place.
    #[default]
    Copy,
    Move,
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionMode::Copy => write!(f, "copy"),
            ActionMode::Move => write!(f, "move"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Performed,
    /// The pair had no destination; nothing was touched.
    Skipped,
}

/// Domain interface for the side effect applied to each resolved item.
///
/// Destination directories must already exist.
pub trait FileAction: Send + Sync {
    fn execute(&self, pair: &DispatchPair) -> std::io::Result<ActionOutcome>;
}
