use std::fmt;

/// Outcome of scoring one image against the reference face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClassificationResult {
    NoFaceDetected,
    Matched { distance: f64 },
    NotMatched { distance: f64 },
}

/// Which output directory an item belongs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoutingDecision {
    ToMatchDir,
    ToNoMatchDir,
}

impl ClassificationResult {
    /// `Matched` iff `distance` is strictly below `threshold`.
    pub fn from_distance(distance: f64, threshold: f64) -> Self {
        if distance < threshold {
            Self::Matched { distance }
        } else {
            Self::NotMatched { distance }
        }
    }

    pub fn routing(&self) -> RoutingDecision {
        match self {
            Self::Matched { .. } => RoutingDecision::ToMatchDir,
            Self::NotMatched { .. } | Self::NoFaceDetected => RoutingDecision::ToNoMatchDir,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            Self::Matched { distance } | Self::NotMatched { distance } => Some(*distance),
            Self::NoFaceDetected => None,
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFaceDetected => write!(f, "no face"),
            Self::Matched { distance } => write!(f, "match (distance {distance:.3})"),
            Self::NotMatched { distance } => write!(f, "no match (distance {distance:.3})"),
        }
    }
}
