//! Joining segments into the final output
//!
//! Hard cuts go through the concat demuxer, first as a stream copy and then,
//! if the copy is rejected, as a full re-encode. Crossfades build one
//! `xfade` + `acrossfade` stage per adjacent pair, each stage taking the
//! previous stage's output as its left input.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::context::CancelSignal;
use crate::domain::errors::DomainError;
use crate::domain::model::{CompositionMode, CompositionPlan, Segment};
use crate::engine::{check_output, step_error, EncoderSettings, FfmpegInvoker};
use crate::planner::CompositionPolicy;
use crate::utils::time::format_decimal;

/// Filter graph of a crossfade chain and its final output labels
#[derive(Debug, Clone, PartialEq)]
pub struct CrossfadeGraph {
    pub filter: String,
    pub video_label: String,
    pub audio_label: String,
}

/// Build the chained crossfade graph for segments of the given durations
///
/// Stage `i` fades the running output into input `i`. Its offset is the
/// length of the chain so far minus the crossfade, floored at zero.
pub fn build_crossfade_graph(durations: &[f64], crossfade: f64) -> CrossfadeGraph {
    let mut video = "[0:v]".to_string();
    let mut audio = "[0:a]".to_string();
    let mut stages = Vec::with_capacity(durations.len().saturating_sub(1) * 2);
    let mut chain_length = durations.first().copied().unwrap_or(0.0);
    let fade = format_decimal(crossfade);

    for (i, duration) in durations.iter().enumerate().skip(1) {
        let offset = (chain_length - crossfade).max(0.0);
        stages.push(format!(
            "{}[{}:v]xfade=transition=fade:duration={}:offset={}[v{}]",
            video,
            i,
            fade,
            format_decimal(offset),
            i
        ));
        stages.push(format!("{}[{}:a]acrossfade=d={}[a{}]", audio, i, fade, i));
        video = format!("[v{}]", i);
        audio = format!("[a{}]", i);
        chain_length += duration - crossfade;
    }

    CrossfadeGraph {
        filter: stages.join(";"),
        video_label: video,
        audio_label: audio,
    }
}

/// Concat demuxer list; single quotes in paths are escaped as `'\''`
pub fn build_concat_list(segments: &[Segment]) -> String {
    let mut body = String::new();
    for segment in segments {
        let path = segment.path.to_string_lossy().replace('\'', "'\\''");
        body.push_str("file '");
        body.push_str(&path);
        body.push_str("'\n");
    }
    body
}

/// Joins ordered segments into one output file
pub struct TransitionComposer {
    ffmpeg: FfmpegInvoker,
    encoder: EncoderSettings,
    policy: CompositionPolicy,
}

impl TransitionComposer {
    pub fn new(ffmpeg: FfmpegInvoker, encoder: EncoderSettings, policy: CompositionPolicy) -> Self {
        Self {
            ffmpeg,
            encoder,
            policy,
        }
    }

    pub fn policy(&self) -> &CompositionPolicy {
        &self.policy
    }

    /// Compose `segments` into `output`
    ///
    /// Segments are joined strictly by index. On failure no partial output
    /// is left behind; on success the consumed segment files are removed.
    pub async fn compose(
        &self,
        segments: Vec<Segment>,
        crossfade: f64,
        output: &Path,
        workspace: &Path,
        cancel: &CancelSignal,
    ) -> Result<CompositionPlan, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::CompositionFailure(
                "No segments to compose".to_string(),
            ));
        }
        cancel.checkpoint()?;

        let plan = self.policy.plan(segments, crossfade);
        let result = match plan.mode {
            CompositionMode::HardCut => {
                self.concat(&plan.segments, output, workspace, cancel).await
            }
            CompositionMode::Crossfade(_) if plan.segments.len() == 1 => {
                Self::copy_single(&plan.segments[0], output).await
            }
            CompositionMode::Crossfade(duration) => {
                self.crossfade(&plan.segments, duration, output, cancel).await
            }
        };

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(output).await;
            return Err(e);
        }

        for segment in &plan.segments {
            let _ = tokio::fs::remove_file(&segment.path).await;
        }
        info!(
            output = %output.display(),
            segments = plan.segments.len(),
            mode = %plan.mode,
            "Composed output"
        );
        Ok(plan)
    }

    async fn concat(
        &self,
        segments: &[Segment],
        output: &Path,
        workspace: &Path,
        cancel: &CancelSignal,
    ) -> Result<(), DomainError> {
        let list_path = workspace.join("concat_list.txt");
        tokio::fs::write(&list_path, build_concat_list(segments))
            .await
            .map_err(|e| {
                DomainError::CompositionFailure(format!("Failed to write concat list: {}", e))
            })?;

        let input_args = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.display().to_string(),
        ];

        let mut copy_args = input_args.clone();
        copy_args.extend(["-c".to_string(), "copy".to_string()]);
        copy_args.push(output.display().to_string());

        let copy_result = self
            .ffmpeg
            .run(copy_args, cancel)
            .await
            .map_err(|e| step_error(e, DomainError::CompositionFailure))?;
        let copy_error = match check_output(&copy_result, output) {
            Ok(()) => {
                debug!("Concatenated segments with stream copy");
                return Ok(());
            }
            Err(diagnostics) => diagnostics,
        };

        warn!(
            diagnostics = %copy_error,
            "Stream-copy concat failed, retrying with re-encode"
        );
        let _ = tokio::fs::remove_file(output).await;

        let mut encode_args = input_args;
        encode_args.extend(self.encoder.encode_args());
        encode_args.push(output.display().to_string());

        let encode_result = self
            .ffmpeg
            .run(encode_args, cancel)
            .await
            .map_err(|e| step_error(e, DomainError::CompositionFailure))?;
        check_output(&encode_result, output).map_err(|diagnostics| {
            DomainError::CompositionFailure(format!(
                "concat failed after re-encode retry: {}",
                diagnostics
            ))
        })
    }

    async fn crossfade(
        &self,
        segments: &[Segment],
        duration: f64,
        output: &Path,
        cancel: &CancelSignal,
    ) -> Result<(), DomainError> {
        let durations: Vec<f64> = segments.iter().map(Segment::duration).collect();
        let graph = build_crossfade_graph(&durations, duration);
        debug!(stages = segments.len() - 1, "Built crossfade graph");

        let mut args = Vec::with_capacity(segments.len() * 2 + 20);
        for segment in segments {
            args.push("-i".to_string());
            args.push(segment.path.display().to_string());
        }
        args.extend([
            "-filter_complex".to_string(),
            graph.filter,
            "-map".to_string(),
            graph.video_label,
            "-map".to_string(),
            graph.audio_label,
        ]);
        args.extend(self.encoder.encode_args());
        args.push(output.display().to_string());

        let result = self
            .ffmpeg
            .run(args, cancel)
            .await
            .map_err(|e| step_error(e, DomainError::CompositionFailure))?;
        check_output(&result, output).map_err(|diagnostics| {
            DomainError::CompositionFailure(format!("crossfade failed: {}", diagnostics))
        })
    }

    async fn copy_single(segment: &Segment, output: &Path) -> Result<(), DomainError> {
        tokio::fs::copy(&segment.path, output)
            .await
            .map(|_| ())
            .map_err(|e| {
                DomainError::CompositionFailure(format!(
                    "Failed to copy single segment {}: {}",
                    segment.path.display(),
                    e
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeSpan;
    use std::path::PathBuf;

    #[test]
    fn test_crossfade_graph_offsets() {
        let graph = build_crossfade_graph(&[5.0, 4.0, 3.0], 1.0);
        assert_eq!(
            graph.filter,
            "[0:v][1:v]xfade=transition=fade:duration=1:offset=4[v1];\
             [0:a][1:a]acrossfade=d=1[a1];\
             [v1][2:v]xfade=transition=fade:duration=1:offset=7[v2];\
             [a1][2:a]acrossfade=d=1[a2]"
        );
        assert_eq!(graph.video_label, "[v2]");
        assert_eq!(graph.audio_label, "[a2]");
    }

    #[test]
    fn test_crossfade_graph_pairs_audio_with_video() {
        let graph = build_crossfade_graph(&[2.0; 6], 0.5);
        let xfades = graph.filter.matches("xfade=").count();
        let acrossfades = graph.filter.matches("acrossfade=").count();
        assert_eq!(xfades, 5);
        assert_eq!(acrossfades, 5);
    }

    #[test]
    fn test_crossfade_offset_floors_at_zero() {
        let graph = build_crossfade_graph(&[0.4, 3.0], 1.0);
        assert!(graph.filter.contains("offset=0[v1]"));
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let segments = vec![
            Segment::new(
                0,
                TimeSpan::new(0.0, 1.0).unwrap(),
                PathBuf::from("/tmp/it's here/seg_0000.mp4"),
            ),
            Segment::new(
                1,
                TimeSpan::new(2.0, 3.0).unwrap(),
                PathBuf::from("/tmp/plain/seg_0001.mp4"),
            ),
        ];
        assert_eq!(
            build_concat_list(&segments),
            "file '/tmp/it'\\''s here/seg_0000.mp4'\nfile '/tmp/plain/seg_0001.mp4'\n"
        );
    }
}
