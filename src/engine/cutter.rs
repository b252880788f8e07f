//! Segment extraction: one re-encoded clip per kept span

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::context::CancelSignal;
use crate::domain::errors::DomainError;
use crate::domain::model::{EditPlan, Segment, TimeSpan};
use crate::engine::{check_output, step_error, EncoderSettings, FfmpegInvoker};
use crate::utils::time::format_decimal;

/// Cuts kept spans out of a source file
///
/// Spans are always re-encoded; stream copy only cuts on keyframes and
/// would shift the boundaries.
pub struct SegmentCutter {
    ffmpeg: FfmpegInvoker,
    encoder: EncoderSettings,
}

impl SegmentCutter {
    pub fn new(ffmpeg: FfmpegInvoker, encoder: EncoderSettings) -> Self {
        Self { ffmpeg, encoder }
    }

    /// Segment file name for plan position `index`
    pub fn segment_path(workspace: &Path, index: usize) -> PathBuf {
        workspace.join(format!("seg_{:04}.mp4", index))
    }

    pub fn build_args(&self, source: &Path, span: &TimeSpan, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-ss".to_string(),
            format_decimal(span.start),
            "-to".to_string(),
            format_decimal(span.end),
            "-i".to_string(),
            source.display().to_string(),
        ];
        args.extend(self.encoder.encode_args());
        args.push(output.display().to_string());
        args
    }

    /// Cut every span of `plan` into `workspace`, in plan order
    ///
    /// The first failing span aborts the whole run with
    /// [`DomainError::CutFailure`]; already written segments are left for the
    /// caller's workspace cleanup.
    pub async fn cut(
        &self,
        source: &Path,
        plan: &EditPlan,
        workspace: &Path,
        cancel: &CancelSignal,
    ) -> Result<Vec<Segment>, DomainError> {
        let mut segments = Vec::with_capacity(plan.len());

        for (index, span) in plan.spans().iter().enumerate() {
            cancel.checkpoint()?;
            let path = Self::segment_path(workspace, index);
            debug!(index, span = %span, "Cutting segment");

            let output = self
                .ffmpeg
                .run(self.build_args(source, span, &path), cancel)
                .await
                .map_err(|e| {
                    step_error(e, |message| DomainError::CutFailure { index, message })
                })?;
            check_output(&output, &path)
                .map_err(|message| DomainError::CutFailure { index, message })?;

            segments.push(Segment::new(index, *span, path));
        }

        info!(segments = segments.len(), "Cut all segments");
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_path_is_zero_padded() {
        let path = SegmentCutter::segment_path(Path::new("/tmp/ws"), 7);
        assert_eq!(path, PathBuf::from("/tmp/ws/seg_0007.mp4"));
    }
}
