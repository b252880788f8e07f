//! Edit planning: kept-span computation and join-mode policy

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

pub mod composition;
pub mod interval;

pub use composition::CompositionPolicy;
pub use interval::IntervalPlanner;

/// Segment count above which a requested crossfade becomes a hard cut
pub const DEFAULT_SEGMENT_FALLBACK_THRESHOLD: usize = 120;

/// Scalar parameters of the interval planner, all in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Widening applied to each silence span on both sides
    pub margin: f64,
    /// Silences shorter than this are treated as noise and kept
    pub min_silence: f64,
    /// Kept spans shorter than this are dropped
    pub min_kept: f64,
}

impl PlannerParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("margin", self.margin),
            ("min_silence", self.min_silence),
            ("min_kept", self.min_kept),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::BadArgs(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            margin: 0.5,
            min_silence: 1.35,
            min_kept: 0.58,
        }
    }
}
