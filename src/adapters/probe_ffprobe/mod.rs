//! FFprobe adapter for media file probing
//!
//! This module provides FFprobe-based duration and audio layout lookup.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::context::CancelSignal;
use crate::domain::errors::*;
use crate::domain::model::MediaProbe;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    channels: Option<u32>,
}

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    locator: Arc<dyn ToolLocator>,
    executor: Arc<dyn ExecutePort>,
}

impl FfprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(locator: Arc<dyn ToolLocator>, executor: Arc<dyn ExecutePort>) -> Self {
        Self { locator, executor }
    }

    fn build_args(file: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            file.display().to_string(),
        ]
    }

    /// Extract `format.duration` and the audio streams from ffprobe's JSON document
    pub fn parse_probe(json: &str) -> Result<MediaProbe, DomainError> {
        let doc: ProbeDocument = serde_json::from_str(json).map_err(|e| {
            DomainError::ProcessingError(format!("Unreadable ffprobe output: {}", e))
        })?;
        let raw = doc
            .format
            .and_then(|f| f.duration)
            .ok_or_else(|| DomainError::ProcessingError("ffprobe reported no duration".to_string()))?;
        let duration: f64 = raw.trim().parse().map_err(|_| {
            DomainError::ProcessingError(format!("Invalid duration from ffprobe: {}", raw))
        })?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::ProcessingError(format!(
                "Non-positive duration from ffprobe: {}",
                duration
            )));
        }

        let audio_channels = doc
            .streams
            .iter()
            .filter(|stream| stream.codec_type.as_deref() == Some("audio"))
            .map(|stream| stream.channels.unwrap_or(1).max(1))
            .collect();
        Ok(MediaProbe {
            duration,
            audio_channels,
        })
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, file: &Path, cancel: &CancelSignal) -> Result<MediaProbe, DomainError> {
        let program = self.locator.locate(ExternalTool::Ffprobe)?;
        let invocation = ToolInvocation::new(program, Self::build_args(file));
        let output = self.executor.run(&invocation, cancel).await?;
        if !output.success() {
            return Err(DomainError::ProcessingError(format!(
                "ffprobe failed on {}: {}",
                file.display(),
                output.diagnostics(5)
            )));
        }

        let probe = Self::parse_probe(&output.stdout)?;
        debug!(
            file = %file.display(),
            duration = probe.duration,
            audio_streams = probe.audio_channels.len(),
            "Probed media"
        );
        Ok(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe() {
        let json = r#"{
            "streams": [
                {"index": 0, "codec_type": "video"},
                {"index": 1, "codec_type": "audio", "channels": 2},
                {"index": 2, "codec_type": "audio", "channels": 1}
            ],
            "format": {"filename": "a.mp4", "duration": "12.345000"}
        }"#;
        let probe = FfprobeAdapter::parse_probe(json).unwrap();
        assert_eq!(probe.duration, 12.345);
        assert_eq!(probe.audio_channels, vec![2, 1]);
        assert_eq!(probe.channels_of(1), Some(1));
        assert_eq!(probe.channels_of(2), None);
    }

    #[test]
    fn test_parse_probe_without_audio() {
        let json = r#"{"streams": [{"codec_type": "video"}], "format": {"duration": "3.0"}}"#;
        let probe = FfprobeAdapter::parse_probe(json).unwrap();
        assert!(probe.audio_channels.is_empty());
        assert_eq!(probe.channels_of(0), None);
    }

    #[test]
    fn test_parse_probe_missing_duration() {
        assert!(FfprobeAdapter::parse_probe(r#"{"format": {}}"#).is_err());
        assert!(FfprobeAdapter::parse_probe(r#"{}"#).is_err());
    }

    #[test]
    fn test_parse_probe_rejects_garbage() {
        assert!(FfprobeAdapter::parse_probe("not json").is_err());
        assert!(FfprobeAdapter::parse_probe(r#"{"format": {"duration": "N/A"}}"#).is_err());
        assert!(FfprobeAdapter::parse_probe(r#"{"format": {"duration": "0"}}"#).is_err());
    }
}
