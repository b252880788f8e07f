//! Tool discovery adapter backed by the `which` crate

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::ports::{ExternalTool, ToolLocator};

/// Finds ffmpeg/ffprobe from configured paths or PATH
#[derive(Debug, Clone, Default)]
pub struct WhichToolLocator {
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
}

impl WhichToolLocator {
    /// Create new locator with optional explicit executables
    pub fn new(ffmpeg_path: Option<PathBuf>, ffprobe_path: Option<PathBuf>) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    fn configured(&self, tool: ExternalTool) -> Option<&PathBuf> {
        match tool {
            ExternalTool::Ffmpeg => self.ffmpeg_path.as_ref(),
            ExternalTool::Ffprobe => self.ffprobe_path.as_ref(),
        }
    }

    /// ffprobe shipped next to an explicitly configured ffmpeg
    fn sibling_ffprobe(ffmpeg: &Path) -> Option<PathBuf> {
        let is_exe = ffmpeg
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("exe"))
            .unwrap_or(false);
        let name = if is_exe { "ffprobe.exe" } else { "ffprobe" };
        let candidate = ffmpeg.with_file_name(name);
        candidate.is_file().then_some(candidate)
    }
}

impl ToolLocator for WhichToolLocator {
    fn locate(&self, tool: ExternalTool) -> Result<PathBuf, DomainError> {
        if let Some(path) = self.configured(tool) {
            if path.is_file() {
                return Ok(path.clone());
            }
            // A bare name like "ffmpeg6" is still resolved through PATH.
            return which::which(path).map_err(|_| {
                DomainError::ToolMissing(format!(
                    "Configured {} not found: {}",
                    tool,
                    path.display()
                ))
            });
        }

        if tool == ExternalTool::Ffprobe {
            if let Some(sibling) = self.ffmpeg_path.as_deref().and_then(Self::sibling_ffprobe) {
                debug!(path = %sibling.display(), "Using ffprobe next to configured ffmpeg");
                return Ok(sibling);
            }
        }

        which::which(tool.program_name()).map_err(|_| {
            DomainError::ToolMissing(format!(
                "{} not found in PATH; install it or set tools.{}_path",
                tool,
                tool.program_name()
            ))
        })
    }
}
