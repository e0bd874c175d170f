//! Rating/Result Normalizer — deterministic corrections applied to score and
//! boolean-like fields before they leave the pipeline.

pub mod matching;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Lower bound of each 10-point band of a 0–100 raw score, and the 0–10 rating
/// it maps to. Scores of 90 and above (including anything over 100) map to 9.
const SCORE_BUCKETS: &[(i64, u8)] = &[
    (90, 9),
    (80, 8),
    (70, 7),
    (60, 6),
    (50, 5),
    (40, 4),
    (30, 3),
    (20, 2),
    (10, 1),
];

/// Highest rating accepted without rescaling.
pub const MAX_RATING: u8 = 10;

/// Maps a raw rating onto `0..=10`.
///
/// Values above 10 are treated as a 0–100 point score and rescaled through
/// `SCORE_BUCKETS`. Values already in range pass through; negatives become 0.
pub fn normalize_score(raw: i64) -> u8 {
    if raw <= i64::from(MAX_RATING) {
        return raw.max(0) as u8;
    }

    let rating = SCORE_BUCKETS
        .iter()
        .find(|(lower, _)| raw >= *lower)
        .map(|(_, rating)| *rating)
        .unwrap_or(0);
    warn!(raw, rating, "Rating was above {MAX_RATING}, rescaled from 100-point score");
    rating
}

/// A boolean as the service may send it: `true`, `1`, or `"yes"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for BoolLike {
    fn from(value: bool) -> Self {
        BoolLike::Bool(value)
    }
}

/// Booleans pass through; 0 is false and any other integer is true; text is
/// true for "true", "yes", "y" or "1" (case-insensitive).
pub fn normalize_boolean(value: &BoolLike) -> bool {
    match value {
        BoolLike::Bool(b) => *b,
        BoolLike::Int(n) => {
            debug!(value = n, "Coerced integer to boolean");
            *n != 0
        }
        BoolLike::Text(text) => {
            let coerced = matches!(
                text.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1"
            );
            debug!(value = text.as_str(), coerced, "Coerced text to boolean");
            coerced
        }
    }
}
