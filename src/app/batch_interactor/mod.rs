// Batch interactor - Runs the per-file pipeline over a folder

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::app::autocut_interactor::{AutoCutInteractor, CutRequest};
use crate::domain::context::RunContext;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;

/// Interactor for folder processing
///
/// Files are processed one at a time in natural order. A failing file is
/// recorded and the batch moves on; after cancellation the remaining files
/// are reported as cancelled and finished outputs are left in place.
pub struct BatchInteractor {
    autocut: Arc<AutoCutInteractor>,
}

impl BatchInteractor {
    pub fn new(autocut: Arc<AutoCutInteractor>) -> Self {
        Self { autocut }
    }

    /// Media files directly inside `folder`, in natural order
    pub fn discover(folder: &Path) -> Result<Vec<PathBuf>, DomainError> {
        if !folder.is_dir() {
            return Err(DomainError::FsFail(format!(
                "Folder does not exist: {}",
                folder.display()
            )));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable folder entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && MediaFilter::is_media_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort_by(|a, b| natural_cmp(a, b));
        Ok(files)
    }

    /// Process every media file of `folder`
    ///
    /// Only a missing or unreadable folder is an error; per-file failures
    /// end up in the report.
    pub async fn run(&self, folder: &Path, ctx: &RunContext) -> Result<BatchReport, DomainError> {
        let started_at = Utc::now();
        let files = Self::discover(folder)?;
        info!(folder = %folder.display(), files = files.len(), "Starting batch");

        let mut items = Vec::with_capacity(files.len());
        for (position, path) in files.into_iter().enumerate() {
            if OutputNaming::has_completed_marker(&path) {
                info!(file = %path.display(), "Already processed, skipping");
                items.push(BatchItem::new(path, BatchStatus::Skipped));
                continue;
            }
            if ctx.is_cancelled() {
                items.push(BatchItem::new(path, BatchStatus::Cancelled));
                continue;
            }

            info!(file = %path.display(), position = position + 1, "Batch item");
            let request = CutRequest::new(&path).with_fade_out(true).in_batch(folder);
            let status = match self.autocut.process_file(&request, ctx).await {
                Ok(report) => {
                    for warning in &report.warnings {
                        warn!(file = %path.display(), warning = %warning, "Completed with warning");
                    }
                    BatchStatus::Succeeded {
                        output: report.output,
                    }
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "File failed");
                    BatchStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            items.push(BatchItem::new(path, status));
        }

        let report = BatchReport {
            folder: folder.to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            items,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped(),
            cancelled = report.cancelled(),
            "Batch finished"
        );
        Ok(report)
    }
}
