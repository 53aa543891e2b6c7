use serde::Serialize;

use super::domain::AccessStatus;

/// Confidence assigned whenever the open-map signal is present.
pub const EXTERNAL_SIGNAL_CONFIDENCE: f64 = 0.8;
/// Vote ratio at or above which reports settle on YES.
pub const YES_RATIO_THRESHOLD: f64 = 0.7;
/// Vote ratio at or below which reports settle on NO.
pub const NO_RATIO_THRESHOLD: f64 = 0.3;
/// Confidence reported for a split vote.
pub const SPLIT_VOTE_CONFIDENCE: f64 = 0.4;

const VOTE_BASE_CONFIDENCE: f64 = 0.6;
const VOTE_RATIO_WEIGHT: f64 = 0.4;

/// Outcome of folding vote tallies and the external signal together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub status: AccessStatus,
    pub confidence: f64,
}

impl Decision {
    pub fn unknown() -> Self {
        Self {
            status: AccessStatus::Unknown,
            confidence: 0.0,
        }
    }
}

/// Resolve a status and confidence from vote tallies and the external signal.
///
/// The external signal wins outright and is never blended with votes.
pub fn decide(votes_yes: u32, votes_no: u32, external_signal: bool) -> Decision {
    if external_signal {
        return Decision {
            status: AccessStatus::Yes,
            confidence: EXTERNAL_SIGNAL_CONFIDENCE,
        };
    }

    let total = u64::from(votes_yes) + u64::from(votes_no);
    if total == 0 {
        return Decision::unknown();
    }

    let ratio = f64::from(votes_yes) / total as f64;
    if ratio >= YES_RATIO_THRESHOLD {
        Decision {
            status: AccessStatus::Yes,
            confidence: VOTE_BASE_CONFIDENCE + VOTE_RATIO_WEIGHT * ratio,
        }
    } else if ratio <= NO_RATIO_THRESHOLD {
        Decision {
            status: AccessStatus::No,
            confidence: VOTE_BASE_CONFIDENCE + VOTE_RATIO_WEIGHT * (1.0 - ratio),
        }
    } else {
        Decision {
            status: AccessStatus::Unknown,
            confidence: SPLIT_VOTE_CONFIDENCE,
        }
    }
}
