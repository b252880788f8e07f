//! Moving finished results into their final location

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::DomainError;

/// Output file writer
///
/// The final path only ever receives a complete file: a same-filesystem
/// rename is atomic, and the cross-filesystem fallback copies into a hidden
/// staging file next to the target before renaming it into place.
pub struct OutputWriter;

impl OutputWriter {
    /// Move `from` to `to`, creating the target directory and replacing any existing file
    pub async fn finalize(from: &Path, to: &Path) -> Result<(), DomainError> {
        Self::ensure_output_directory(to).await?;

        match tokio::fs::rename(from, to).await {
            Ok(()) => {
                info!(output = %to.display(), "Output written");
                return Ok(());
            }
            Err(e) => debug!(error = %e, "Rename failed, copying instead"),
        }

        let staging = Self::staging_path(to)?;
        let copied = match tokio::fs::copy(from, &staging).await {
            Ok(_) => tokio::fs::rename(&staging, to).await,
            Err(e) => Err(e),
        };

        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(DomainError::FsFail(format!(
                "Failed to write output {}: {}",
                to.display(),
                e
            )));
        }

        let _ = tokio::fs::remove_file(from).await;
        info!(output = %to.display(), "Output written");
        Ok(())
    }

    /// Hidden sibling of `final_path` used while copying
    fn staging_path(final_path: &Path) -> Result<PathBuf, DomainError> {
        let filename = final_path.file_name().ok_or_else(|| {
            DomainError::FsFail(format!("Invalid output file path: {}", final_path.display()))
        })?;
        Ok(final_path.with_file_name(format!(".tmp_{}", filename.to_string_lossy())))
    }

    async fn ensure_output_directory(path: &Path) -> Result<(), DomainError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::FsFail(format!(
                    "Failed to create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
