//! Settings tree with defaults and validation
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::model::{DetectionMode, DetectionParams};
use crate::engine::EncoderSettings;
use crate::error::{AutoCutError, AutoCutResult};
use crate::planner::{CompositionPolicy, PlannerParams, DEFAULT_SEGMENT_FALLBACK_THRESHOLD};

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub edit: EditSettings,
    pub encoder: EncoderSettings,
    pub output: OutputSettings,
    pub tools: ToolSettings,
    pub logging: LoggingSettings,
}

/// Silence analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub threshold_db: f64,
    pub min_silence: f64,
    pub mode: DetectionMode,
    pub audio_track: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold_db: -30.0,
            min_silence: 1.35,
            mode: DetectionMode::Mixed,
            audio_track: 0,
        }
    }
}

/// Planning and composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    pub margin: f64,
    pub min_kept_clip: f64,
    pub crossfade: f64,
    pub segment_fallback_threshold: usize,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            margin: 0.5,
            min_kept_clip: 0.58,
            crossfade: 0.0,
            segment_fallback_threshold: DEFAULT_SEGMENT_FALLBACK_THRESHOLD,
        }
    }
}

/// Single file or folder processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Single,
    Batch,
}

/// Post-processing and naming of outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub mode: OutputMode,
    pub fade_out_seconds: f64,
    pub extract_frames: bool,
    pub frame_interval: u32,
    pub frames_folder: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            mode: OutputMode::Single,
            fade_out_seconds: 2.0,
            extract_frames: false,
            frame_interval: 30,
            frames_folder: None,
        }
    }
}

/// Explicit tool locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Log output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level or full env-filter directive
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    pub fn planner_params(&self) -> PlannerParams {
        PlannerParams {
            margin: self.edit.margin,
            min_silence: self.detection.min_silence,
            min_kept: self.edit.min_kept_clip,
        }
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            threshold_db: self.detection.threshold_db,
            min_silence: self.detection.min_silence,
            mode: self.detection.mode,
            audio_track: self.detection.audio_track,
        }
    }

    pub fn composition_policy(&self) -> CompositionPolicy {
        CompositionPolicy::new(self.edit.segment_fallback_threshold)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> AutoCutResult<()> {
        let invalid = |message: String| AutoCutError::InvalidConfig { message };

        if !self.detection.threshold_db.is_finite() {
            return Err(invalid(format!(
                "detection.threshold_db must be a number, got {}",
                self.detection.threshold_db
            )));
        }

        for (name, value) in [
            ("detection.min_silence", self.detection.min_silence),
            ("edit.margin", self.edit.margin),
            ("edit.min_kept_clip", self.edit.min_kept_clip),
            ("edit.crossfade", self.edit.crossfade),
            ("output.fade_out_seconds", self.output.fade_out_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }

        if self.edit.segment_fallback_threshold == 0 {
            return Err(invalid(
                "edit.segment_fallback_threshold must be at least 1".to_string(),
            ));
        }
        if self.output.frame_interval == 0 {
            return Err(invalid("output.frame_interval must be at least 1".to_string()));
        }
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(invalid(format!(
                "logging.level is not a level or filter directive: {}",
                self.logging.level
            )));
        }

        self.encoder.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.detection.threshold_db, -30.0);
        assert_eq!(settings.detection.min_silence, 1.35);
        assert_eq!(settings.edit.margin, 0.5);
        assert_eq!(settings.edit.min_kept_clip, 0.58);
        assert_eq!(settings.edit.crossfade, 0.0);
        assert_eq!(settings.edit.segment_fallback_threshold, 120);
        assert_eq!(settings.output.frame_interval, 30);
        assert_eq!(settings.output.fade_out_seconds, 2.0);
        assert_eq!(settings.encoder.crf, 18);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_conversions() {
        let settings = Settings::default();
        assert_eq!(settings.planner_params(), PlannerParams::default());
        assert_eq!(settings.composition_policy().fallback_threshold(), 120);
        let detection = settings.detection_params();
        assert_eq!(detection.mode, DetectionMode::Mixed);
        assert_eq!(detection.audio_track, 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.edit.margin = -0.1;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.encoder.crf = 60;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.output.frame_interval = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.edit.segment_fallback_threshold = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.edit.crossfade = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [edit]
            crossfade = 0.25

            [detection]
            mode = "per_channel"
            "#,
        )
        .unwrap();
        assert_eq!(settings.edit.crossfade, 0.25);
        assert_eq!(settings.edit.margin, 0.5);
        assert_eq!(settings.detection.mode, DetectionMode::PerChannel);
        assert_eq!(settings.encoder.preset, "veryfast");
    }
}
