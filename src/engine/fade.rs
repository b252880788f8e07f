//! Trailing video fade-out post-step

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::context::CancelSignal;
use crate::domain::errors::DomainError;
use crate::engine::{check_output, step_error, EncoderSettings, FfmpegInvoker};
use crate::ports::ProbePort;
use crate::utils::time::format_decimal;

/// Fades the picture to black over the last seconds; audio is copied
pub struct FadeOut {
    ffmpeg: FfmpegInvoker,
    probe: Arc<dyn ProbePort>,
    encoder: EncoderSettings,
}

impl FadeOut {
    pub fn new(ffmpeg: FfmpegInvoker, probe: Arc<dyn ProbePort>, encoder: EncoderSettings) -> Self {
        Self {
            ffmpeg,
            probe,
            encoder,
        }
    }

    /// `fade=t=out:st=<start>:d=<seconds>` for a clip of `duration` seconds
    pub fn fade_filter(duration: f64, seconds: f64) -> String {
        let start = (duration - seconds).max(0.0);
        format!("fade=t=out:st={:.2}:d={}", start, format_decimal(seconds))
    }

    /// Write a faded copy of `input` to `output`
    ///
    /// Any failure is a [`DomainError::FadeFailure`]; `input` is never touched.
    pub async fn apply(
        &self,
        input: &Path,
        output: &Path,
        seconds: f64,
        cancel: &CancelSignal,
    ) -> Result<(), DomainError> {
        let duration = self
            .probe
            .probe_duration(input, cancel)
            .await
            .map_err(|e| step_error(e, DomainError::FadeFailure))?;

        let mut args = vec![
            "-i".to_string(),
            input.display().to_string(),
            "-vf".to_string(),
            Self::fade_filter(duration, seconds),
        ];
        args.extend(self.encoder.video_args());
        args.extend(["-c:a".to_string(), "copy".to_string()]);
        args.push(output.display().to_string());

        let result = match self.ffmpeg.run(args, cancel).await {
            Ok(result) => result,
            Err(e) => {
                let _ = tokio::fs::remove_file(output).await;
                return Err(step_error(e, DomainError::FadeFailure));
            }
        };
        if let Err(diagnostics) = check_output(&result, output) {
            let _ = tokio::fs::remove_file(output).await;
            return Err(DomainError::FadeFailure(diagnostics));
        }

        info!(output = %output.display(), seconds, "Applied fade-out");
        Ok(())
    }
}
