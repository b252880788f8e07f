//! Frame sampling post-process

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::context::CancelSignal;
use crate::domain::errors::DomainError;
use crate::engine::{step_error, FfmpegInvoker};

/// Writes every Nth frame of a video as PNG
pub struct FrameExtractor {
    ffmpeg: FfmpegInvoker,
}

impl FrameExtractor {
    pub fn new(ffmpeg: FfmpegInvoker) -> Self {
        Self { ffmpeg }
    }

    /// Folder that holds the per-video frame folders
    ///
    /// The configured folder wins. Batch runs default to
    /// `<folder>/<folder name>_frames`, single files to
    /// `<output dir>/<output stem>_frames`.
    pub fn frames_root(configured: Option<&Path>, batch_folder: Option<&Path>, output: &Path) -> PathBuf {
        if let Some(root) = configured {
            return root.to_path_buf();
        }
        if let Some(folder) = batch_folder {
            let name = folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "batch".to_string());
            return folder.join(format!("{}_frames", name));
        }
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = stem_of(output);
        parent.join(format!("{}_frames", stem))
    }

    pub fn select_filter(interval: u32) -> String {
        format!("select=not(mod(n\\,{}))", interval)
    }

    /// Sample `video` into `<frames_root>/<video stem>/frame_%06d.png`
    pub async fn extract(
        &self,
        video: &Path,
        frames_root: &Path,
        interval: u32,
        cancel: &CancelSignal,
    ) -> Result<PathBuf, DomainError> {
        if interval == 0 {
            return Err(DomainError::BadArgs("frame interval must be at least 1".to_string()));
        }

        let dir = frames_root.join(stem_of(video));
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::FsFail(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let args = vec![
            "-i".to_string(),
            video.display().to_string(),
            "-vf".to_string(),
            Self::select_filter(interval),
            "-vsync".to_string(),
            "vfr".to_string(),
            dir.join("frame_%06d.png").display().to_string(),
        ];
        let output = self
            .ffmpeg
            .run(args, cancel)
            .await
            .map_err(|e| step_error(e, DomainError::ProcessingError))?;
        if !output.success() {
            return Err(DomainError::ProcessingError(format!(
                "frame extraction failed: {}",
                output.diagnostics(5)
            )));
        }

        info!(dir = %dir.display(), interval, "Extracted frames");
        Ok(dir)
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_root_precedence() {
        let output = Path::new("/videos/talk_autocut.mp4");
        assert_eq!(
            FrameExtractor::frames_root(Some(Path::new("/frames")), Some(Path::new("/videos")), output),
            PathBuf::from("/frames")
        );
        assert_eq!(
            FrameExtractor::frames_root(None, Some(Path::new("/videos")), output),
            PathBuf::from("/videos/videos_frames")
        );
        assert_eq!(
            FrameExtractor::frames_root(None, None, output),
            PathBuf::from("/videos/talk_autocut_frames")
        );
    }

    #[test]
    fn test_select_filter_escapes_comma() {
        assert_eq!(FrameExtractor::select_filter(30), "select=not(mod(n\\,30))");
    }
}
