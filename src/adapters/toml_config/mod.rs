// TOML config adapter - Loads the settings file (TOML, or YAML by extension)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Settings;
use crate::error::{AutoCutError, AutoCutResult};

/// Files tried, in order, when no `--config` is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["autocut.toml", "config/autocut.toml"];

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Read and parse `path`; `.yaml`/`.yml` go through serde_yaml, everything else through toml
    pub fn load(path: &Path) -> AutoCutResult<Settings> {
        let content = std::fs::read_to_string(path).map_err(|source| AutoCutError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Parsing config file");
        Self::parse(&content, Self::is_yaml(path))
    }

    pub fn parse(content: &str, yaml: bool) -> AutoCutResult<Settings> {
        if yaml {
            Ok(serde_yaml::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// First default config file that exists below `base`
    pub fn discover(base: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|candidate| candidate.is_file())
    }

    fn is_yaml(path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                ext == "yaml" || ext == "yml"
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autocut.toml");
        std::fs::write(
            &path,
            "[detection]\nthreshold_db = -42.0\n\n[tools]\nffmpeg_path = \"/opt/ffmpeg/bin/ffmpeg\"\n",
        )
        .unwrap();

        let settings = TomlConfigAdapter::load(&path).unwrap();
        assert_eq!(settings.detection.threshold_db, -42.0);
        assert_eq!(
            settings.tools.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert_eq!(settings.edit.margin, 0.5);
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autocut.yml");
        std::fs::write(&path, "edit:\n  crossfade: 0.5\noutput:\n  frame_interval: 15\n").unwrap();

        let settings = TomlConfigAdapter::load(&path).unwrap();
        assert_eq!(settings.edit.crossfade, 0.5);
        assert_eq!(settings.output.frame_interval, 15);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            TomlConfigAdapter::load(&dir.path().join("missing.toml")),
            Err(AutoCutError::ConfigRead { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[edit\nmargin = ").unwrap();
        assert!(matches!(
            TomlConfigAdapter::load(&bad),
            Err(AutoCutError::Toml(_))
        ));
    }

    #[test]
    fn test_discover_prefers_root_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TomlConfigAdapter::discover(dir.path()), None);

        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join("config/autocut.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::discover(dir.path()),
            Some(dir.path().join("config/autocut.toml"))
        );

        std::fs::write(dir.path().join("autocut.toml"), "").unwrap();
        assert_eq!(
            TomlConfigAdapter::discover(dir.path()),
            Some(dir.path().join("autocut.toml"))
        );
    }
}
