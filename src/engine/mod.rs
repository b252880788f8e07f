//! Media engine: drives ffmpeg for cutting, composing and post-processing
//!
//! Every step writes into the per-file workspace handed in by the caller and
//! reports failures with the [`DomainError`] kind that belongs to the step.
//! Cancellation is never re-labelled: a [`DomainError::Cancelled`] coming
//! from the executor passes through untouched.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::context::CancelSignal;
use crate::domain::errors::DomainError;
use crate::ports::{ExecutePort, ExternalTool, ToolInvocation, ToolLocator, ToolOutput};

pub mod composer;
pub mod cutter;
pub mod fade;
pub mod frames;

pub use composer::TransitionComposer;
pub use cutter::SegmentCutter;
pub use fade::FadeOut;
pub use frames::FrameExtractor;

/// Runs ffmpeg through the injected locator and executor
#[derive(Clone)]
pub struct FfmpegInvoker {
    locator: Arc<dyn ToolLocator>,
    executor: Arc<dyn ExecutePort>,
}

impl FfmpegInvoker {
    pub fn new(locator: Arc<dyn ToolLocator>, executor: Arc<dyn ExecutePort>) -> Self {
        Self { locator, executor }
    }

    /// Run ffmpeg quietly with overwrite enabled; `args` end with the output path
    pub async fn run(
        &self,
        args: Vec<String>,
        cancel: &CancelSignal,
    ) -> Result<ToolOutput, DomainError> {
        let program = self.locator.locate(ExternalTool::Ffmpeg)?;
        let mut full = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
        ];
        full.extend(args);
        self.executor
            .run(&ToolInvocation::new(program, full), cancel)
            .await
    }
}

/// Re-encode parameters shared by every lossy step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub video_codec: String,
    /// Constant Rate Factor (0-51)
    pub crf: u8,
    pub preset: String,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Encoder threads; `Some(0)` means one per logical CPU, `None` leaves it to ffmpeg
    pub threads: Option<usize>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 18,
            preset: "veryfast".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            threads: None,
        }
    }
}

impl EncoderSettings {
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Resolved thread count, if one should be passed
    pub fn thread_count(&self) -> Option<usize> {
        self.threads
            .map(|n| if n == 0 { num_cpus::get() } else { n })
    }

    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-preset".to_string(),
            self.preset.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
        ];
        if let Some(threads) = self.thread_count() {
            args.push("-threads".to_string());
            args.push(threads.to_string());
        }
        args
    }

    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }

    /// Full audio+video re-encode arguments
    pub fn encode_args(&self) -> Vec<String> {
        let mut args = self.video_args();
        args.extend(self.audio_args());
        args
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.crf > 51 {
            return Err(DomainError::BadArgs(format!(
                "CRF value cannot exceed 51, got {}",
                self.crf
            )));
        }
        for (name, value) in [
            ("video_codec", &self.video_codec),
            ("preset", &self.preset),
            ("pixel_format", &self.pixel_format),
            ("audio_codec", &self.audio_codec),
            ("audio_bitrate", &self.audio_bitrate),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::BadArgs(format!("encoder.{} cannot be empty", name)));
            }
        }
        Ok(())
    }
}

/// Re-label a step error, letting cancellation through
pub(crate) fn step_error(err: DomainError, wrap: impl FnOnce(String) -> DomainError) -> DomainError {
    match err {
        DomainError::Cancelled => DomainError::Cancelled,
        other => wrap(other.to_string()),
    }
}

/// Check a finished tool run: exit 0 and a non-empty output file
pub(crate) fn check_output(output: &ToolOutput, path: &Path) -> Result<(), String> {
    if !output.success() {
        return Err(output.diagnostics(10));
    }
    crate::output::verifier::OutputVerifier::ensure_non_empty(path).map(|_| ())
}
