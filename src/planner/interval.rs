//! Silence spans to kept spans

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{EditPlan, SilenceReport, TimeSpan};
use crate::planner::PlannerParams;

/// Turns a silence report into an edit plan
///
/// Pure: the result depends only on the report, the parameters and the
/// total duration.
#[derive(Debug, Clone, Default)]
pub struct IntervalPlanner {
    params: PlannerParams,
}

impl IntervalPlanner {
    /// Create a new interval planner
    pub fn new(params: PlannerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    /// Compute the kept spans of a source of `total_duration` seconds
    ///
    /// 1. drop silences shorter than `min_silence`
    /// 2. widen the rest by `margin` on both sides, clamped to the source
    /// 3. merge overlapping or touching silences
    /// 4. take the complement over `[0, total_duration]`
    /// 5. drop kept spans shorter than `min_kept`
    pub fn plan(
        &self,
        silences: &SilenceReport,
        total_duration: f64,
    ) -> Result<EditPlan, DomainError> {
        self.params.validate()?;
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Total duration must be positive, got {}",
                total_duration
            )));
        }

        let PlannerParams {
            margin,
            min_silence,
            min_kept,
        } = self.params;

        let expanded: Vec<(f64, f64)> = silences
            .spans()
            .iter()
            .filter(|span| span.duration() >= min_silence)
            .map(|span| {
                (
                    (span.start - margin).max(0.0),
                    (span.end + margin).min(total_duration),
                )
            })
            .filter(|(start, end)| end > start)
            .collect();

        let merged = merge(expanded);
        let kept: Vec<TimeSpan> = invert(&merged, total_duration)
            .into_iter()
            .filter(|&(start, end)| end - start >= min_kept)
            .filter_map(|(start, end)| TimeSpan::new(start, end).ok())
            .collect();

        debug!(
            silences = silences.len(),
            merged = merged.len(),
            kept = kept.len(),
            "Planned kept spans"
        );

        Ok(EditPlan::from_ordered(kept, total_duration))
    }
}

/// Sort by start and merge spans whose start is at or before the running end
pub fn merge(mut spans: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => {
                last.1 = last.1.max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Complement of ordered, disjoint spans over `[0, total]`; empty gaps are omitted
pub fn invert(spans: &[(f64, f64)], total: f64) -> Vec<(f64, f64)> {
    let mut gaps = Vec::with_capacity(spans.len() + 1);
    let mut cursor = 0.0_f64;
    for &(start, end) in spans {
        if start > cursor {
            gaps.push((cursor, start));
        }
        cursor = cursor.max(end);
    }
    if total > cursor {
        gaps.push((cursor, total));
    }
    gaps
}

/// Overlap of two ordered, disjoint span lists; empty overlaps are omitted
pub fn intersect(a: &[(f64, f64)], b: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let start = a[i].0.max(b[j].0);
        let end = a[i].1.min(b[j].1);
        if end > start {
            out.push((start, end));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}
