//! Join-mode selection for a list of segments

use tracing::{info, warn};

use crate::domain::model::{CompositionMode, CompositionPlan, Segment};
use crate::planner::DEFAULT_SEGMENT_FALLBACK_THRESHOLD;

/// Decides between hard-cut concatenation and a crossfade chain
///
/// The crossfade graph grows by one stage per adjacent segment pair, so
/// above `fallback_threshold` segments the policy forces a hard cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionPolicy {
    fallback_threshold: usize,
}

impl CompositionPolicy {
    pub fn new(fallback_threshold: usize) -> Self {
        Self { fallback_threshold }
    }

    pub fn fallback_threshold(&self) -> usize {
        self.fallback_threshold
    }

    /// Mode and fallback flag for `segment_count` segments
    pub fn select_mode(&self, crossfade: f64, segment_count: usize) -> (CompositionMode, bool) {
        if !(crossfade > 0.0) {
            return (CompositionMode::HardCut, false);
        }
        if segment_count > self.fallback_threshold {
            return (CompositionMode::HardCut, true);
        }
        (CompositionMode::Crossfade(crossfade), false)
    }

    /// Attach the selected mode to the segments, keeping their plan order
    pub fn plan(&self, mut segments: Vec<Segment>, crossfade: f64) -> CompositionPlan {
        segments.sort_by_key(|segment| segment.index);
        let (mode, fallback_applied) = self.select_mode(crossfade, segments.len());

        if fallback_applied {
            warn!(
                segments = segments.len(),
                threshold = self.fallback_threshold,
                "Too many segments for a crossfade chain, falling back to hard cuts"
            );
        } else {
            info!(segments = segments.len(), mode = %mode, "Selected composition mode");
        }

        CompositionPlan {
            segments,
            mode,
            fallback_applied,
        }
    }
}

impl Default for CompositionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_FALLBACK_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeSpan;
    use std::path::PathBuf;

    fn segments(count: usize) -> Vec<Segment> {
        (0..count)
            .map(|i| {
                Segment::new(
                    i,
                    TimeSpan::new(i as f64, i as f64 + 0.5).unwrap(),
                    PathBuf::from(format!("seg_{:04}.mp4", i)),
                )
            })
            .collect()
    }

    #[test]
    fn test_zero_crossfade_is_hard_cut() {
        let policy = CompositionPolicy::default();
        for count in [1, 2, 120, 121, 500] {
            assert_eq!(
                policy.select_mode(0.0, count),
                (CompositionMode::HardCut, false)
            );
        }
    }

    #[test]
    fn test_negative_crossfade_is_hard_cut() {
        let policy = CompositionPolicy::default();
        assert_eq!(
            policy.select_mode(-1.0, 3),
            (CompositionMode::HardCut, false)
        );
    }

    #[test]
    fn test_crossfade_at_threshold() {
        let policy = CompositionPolicy::new(120);
        assert_eq!(
            policy.select_mode(1.0, 120),
            (CompositionMode::Crossfade(1.0), false)
        );
    }

    #[test]
    fn test_crossfade_above_threshold_falls_back() {
        let policy = CompositionPolicy::new(120);
        assert_eq!(
            policy.select_mode(1.0, 121),
            (CompositionMode::HardCut, true)
        );
    }

    #[test]
    fn test_plan_sets_fallback_flag() {
        let plan = CompositionPolicy::new(120).plan(segments(121), 1.0);
        assert_eq!(plan.mode, CompositionMode::HardCut);
        assert!(plan.fallback_applied);
        assert_eq!(plan.segments.len(), 121);
    }

    #[test]
    fn test_plan_orders_by_index() {
        let mut segs = segments(4);
        segs.reverse();
        let plan = CompositionPolicy::default().plan(segs, 0.5);
        let order: Vec<usize> = plan.segments.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(plan.mode, CompositionMode::Crossfade(0.5));
    }
}
