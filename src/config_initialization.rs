//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::TomlConfigAdapter;
use crate::cli::{Cli, Commands, EditArgs, ToolArgs};
use crate::config::{OutputMode, Settings};
use crate::domain::model::DetectionMode;
use crate::error::AutoCutResult;

/// Settings after all layers were applied, and the file they started from
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
///
/// Environment variables arrive through clap's `env` attributes, so by the
/// time the CLI is parsed they already sit in the same fields as the flags.
pub fn initialize_configuration_hierarchy(cli: &Cli) -> AutoCutResult<ResolvedConfiguration> {
    let base = std::env::current_dir()?;
    resolve_configuration(cli, &base)
}

/// Same as [`initialize_configuration_hierarchy`] with default files looked up below `base`
pub fn resolve_configuration(cli: &Cli, base: &Path) -> AutoCutResult<ResolvedConfiguration> {
    let source = match &cli.config {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::discover(base),
    };
    let mut settings = match &source {
        Some(path) => TomlConfigAdapter::load(path)?,
        None => Settings::default(),
    };

    apply_global_overrides(&mut settings, cli);
    apply_tool_overrides(&mut settings, cli.command.tool_args());
    if let Some(edit) = cli.command.edit_args() {
        apply_edit_overrides(&mut settings, edit);
    }
    settings.output.mode = match cli.command {
        Commands::Batch(_) => OutputMode::Batch,
        _ => OutputMode::Single,
    };

    settings.validate()?;
    Ok(ResolvedConfiguration { settings, source })
}

fn apply_global_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if cli.json_logs {
        settings.logging.json = true;
    }
}

fn apply_tool_overrides(settings: &mut Settings, tools: &ToolArgs) {
    if let Some(path) = &tools.ffmpeg {
        settings.tools.ffmpeg_path = Some(path.clone());
    }
    if let Some(path) = &tools.ffprobe {
        settings.tools.ffprobe_path = Some(path.clone());
    }
}

fn apply_edit_overrides(settings: &mut Settings, edit: &EditArgs) {
    if let Some(value) = edit.threshold_db {
        settings.detection.threshold_db = value;
    }
    if let Some(value) = edit.min_silence {
        settings.detection.min_silence = value;
    }
    if let Some(value) = edit.audio_track {
        settings.detection.audio_track = value;
    }
    if edit.per_channel {
        settings.detection.mode = DetectionMode::PerChannel;
    }
    if let Some(value) = edit.margin {
        settings.edit.margin = value;
    }
    if let Some(value) = edit.min_clip {
        settings.edit.min_kept_clip = value;
    }
    if let Some(value) = edit.crossfade {
        settings.edit.crossfade = value;
    }
    if let Some(value) = edit.fallback_threshold {
        settings.edit.segment_fallback_threshold = value;
    }
    if let Some(value) = edit.crf {
        settings.encoder.crf = value;
    }
    if let Some(value) = &edit.preset {
        settings.encoder.preset = value.clone();
    }
    if edit.extract_frames {
        settings.output.extract_frames = true;
    }
    if let Some(folder) = &edit.frames_folder {
        settings.output.frames_folder = Some(folder.clone());
    }
    if let Some(value) = edit.frame_interval {
        settings.output.frame_interval = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoCutError;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["autocut", "plan", "--input", "a.mp4"]).unwrap();
        let resolved = resolve_configuration(&cli, dir.path()).unwrap();
        assert_eq!(resolved.source, None);
        assert_eq!(resolved.settings.edit.margin, 0.5);
        assert_eq!(resolved.settings.output.mode, OutputMode::Single);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("autocut.toml"),
            "[edit]\nmargin = 1.0\ncrossfade = 0.5\n\n[detection]\nthreshold_db = -40.0\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "autocut", "batch", "--folder", "in", "--margin", "0.25", "--per-channel",
        ])
        .unwrap();
        let resolved = resolve_configuration(&cli, dir.path()).unwrap();
        let settings = resolved.settings;

        assert_eq!(resolved.source, Some(dir.path().join("autocut.toml")));
        assert_eq!(settings.edit.margin, 0.25);
        assert_eq!(settings.edit.crossfade, 0.5);
        assert_eq!(settings.detection.threshold_db, -40.0);
        assert_eq!(settings.detection.mode, DetectionMode::PerChannel);
        assert_eq!(settings.output.mode, OutputMode::Batch);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = Cli::try_parse_from([
            "autocut",
            "tools",
            "--config",
            missing.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            resolve_configuration(&cli, dir.path()),
            Err(AutoCutError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["autocut", "cut", "--input", "a.mp4", "--margin=-1"]).unwrap();
        assert!(matches!(
            resolve_configuration(&cli, dir.path()),
            Err(AutoCutError::InvalidConfig { .. })
        ));
    }
}
