// AutoCut interactor - Runs the silence-removal pipeline for one file

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::TempDir;
use tracing::{info, warn};

use crate::config::Settings;
use crate::domain::context::{CancelSignal, RunContext};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{
    step_error, FadeOut, FfmpegInvoker, FrameExtractor, SegmentCutter, TransitionComposer,
};
use crate::output::OutputWriter;
use crate::planner::IntervalPlanner;
use crate::ports::*;

/// One file to process
#[derive(Debug, Clone)]
pub struct CutRequest {
    pub input: PathBuf,
    /// Defaults to the completed-output name next to the input
    pub output: Option<PathBuf>,
    pub fade_out: bool,
    /// Folder of the surrounding batch, used for the default frames folder
    pub batch_folder: Option<PathBuf>,
}

impl CutRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            fade_out: false,
            batch_folder: None,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_fade_out(mut self, fade_out: bool) -> Self {
        self.fade_out = fade_out;
        self
    }

    pub fn in_batch(mut self, folder: impl Into<PathBuf>) -> Self {
        self.batch_folder = Some(folder.into());
        self
    }

    /// Final output path
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| OutputNaming::completed_output_path(&self.input))
    }
}

/// Detection, planning and analysis result for one file
struct Analysis {
    duration: f64,
    silence: SilenceReport,
    plan: EditPlan,
}

/// Interactor for the per-file pipeline
///
/// Steps run strictly in order: probe, detect, plan, cut, compose, fade,
/// finalise, frames. The segment workspace lives only as long as one call.
pub struct AutoCutInteractor {
    probe: Arc<dyn ProbePort>,
    detector: Arc<dyn SilenceDetectPort>,
    planner: IntervalPlanner,
    cutter: SegmentCutter,
    composer: TransitionComposer,
    fade: FadeOut,
    frames: FrameExtractor,
    settings: Settings,
}

impl AutoCutInteractor {
    /// Create new interactor with injected ports
    pub fn new(
        probe: Arc<dyn ProbePort>,
        detector: Arc<dyn SilenceDetectPort>,
        ffmpeg: FfmpegInvoker,
        settings: Settings,
    ) -> Self {
        let encoder = settings.encoder.clone();
        Self {
            planner: IntervalPlanner::new(settings.planner_params()),
            cutter: SegmentCutter::new(ffmpeg.clone(), encoder.clone()),
            composer: TransitionComposer::new(
                ffmpeg.clone(),
                encoder.clone(),
                settings.composition_policy(),
            ),
            fade: FadeOut::new(ffmpeg.clone(), Arc::clone(&probe), encoder),
            frames: FrameExtractor::new(ffmpeg),
            probe,
            detector,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Probe, detect and plan without writing anything
    pub async fn plan_file(&self, input: &Path, ctx: &RunContext) -> Result<PlanReport, DomainError> {
        Self::check_input(input)?;
        let analysis = self.analyze(input, ctx.signal()).await?;
        let (mode, fallback_applied) = self
            .composer
            .policy()
            .select_mode(self.settings.edit.crossfade, analysis.plan.len());

        Ok(PlanReport {
            input: input.to_path_buf(),
            source_duration: analysis.duration,
            silences: analysis.silence.spans().to_vec(),
            kept_spans: analysis.plan.spans().to_vec(),
            kept_duration: analysis.plan.kept_duration(),
            mode,
            fallback_applied,
        })
    }

    /// Run the full pipeline for one file
    pub async fn process_file(
        &self,
        request: &CutRequest,
        ctx: &RunContext,
    ) -> Result<CutReport, DomainError> {
        let started = Instant::now();
        let signal = ctx.signal();
        signal.checkpoint()?;

        let input = request.input.as_path();
        Self::check_input(input)?;
        let output = request.output_path();
        info!(input = %input.display(), output = %output.display(), "Processing file");

        let analysis = self.analyze(input, signal).await?;
        let workspace = Self::create_workspace(input, ctx)?;
        let extension = output
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string());
        let mut warnings = Vec::new();

        let segments = self
            .cutter
            .cut(input, &analysis.plan, workspace.path(), signal)
            .await?;

        let composed = workspace.path().join(format!("composed.{}", extension));
        let composition = self
            .composer
            .compose(
                segments,
                self.settings.edit.crossfade,
                &composed,
                workspace.path(),
                signal,
            )
            .await?;

        let mut result = composed.clone();
        let mut faded = false;
        let fade_seconds = self.settings.output.fade_out_seconds;
        if request.fade_out && fade_seconds > 0.0 {
            let faded_path = workspace.path().join(format!("faded.{}", extension));
            match self.fade.apply(&composed, &faded_path, fade_seconds, signal).await {
                Ok(()) => {
                    result = faded_path;
                    faded = true;
                }
                Err(e) if e.is_fatal_for_file() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Fade-out failed, keeping unfaded output");
                    warnings.push(e.to_string());
                }
            }
        }

        signal.checkpoint()?;
        OutputWriter::finalize(&result, &output).await?;
        if let Err(e) = workspace.close() {
            warn!(error = %e, "Failed to remove temp workspace");
        }

        let frames_dir = if self.settings.output.extract_frames {
            self.extract_frames(request, &output, signal, &mut warnings)
                .await
        } else {
            None
        };

        let report = CutReport {
            input: input.to_path_buf(),
            output,
            source_duration: analysis.duration,
            kept_spans: analysis.plan.spans().to_vec(),
            mode: composition.mode,
            fallback_applied: composition.fallback_applied,
            faded,
            frames_dir,
            warnings,
            elapsed: started.elapsed(),
        };
        info!(
            output = %report.output.display(),
            kept = report.kept_spans.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "File done"
        );
        Ok(report)
    }

    async fn analyze(&self, input: &Path, signal: &CancelSignal) -> Result<Analysis, DomainError> {
        let probe = self
            .probe
            .probe(input, signal)
            .await
            .map_err(|e| step_error(e, DomainError::DetectionFailure))?;
        let duration = probe.duration;

        let params = self.settings.detection_params();
        let channels = probe.channels_of(params.audio_track).ok_or_else(|| {
            DomainError::DetectionFailure(format!(
                "{} has no audio track {} ({} audio stream(s) found)",
                input.display(),
                params.audio_track,
                probe.audio_channels.len()
            ))
        })?;
        let silence = self
            .detector
            .detect(input, &params, channels, duration, signal)
            .await?;
        signal.checkpoint()?;

        let plan = self.planner.plan(&silence, duration)?;
        if plan.is_empty() {
            return Err(DomainError::EmptyPlan(format!(
                "no span of {} remains after removing silence below {} dB",
                input.display(),
                params.threshold_db
            )));
        }
        info!(
            kept = plan.len(),
            kept_seconds = plan.kept_duration(),
            removed_seconds = plan.removed_duration(),
            "Planned edit"
        );

        Ok(Analysis {
            duration,
            silence,
            plan,
        })
    }

    async fn extract_frames(
        &self,
        request: &CutRequest,
        output: &Path,
        signal: &CancelSignal,
        warnings: &mut Vec<String>,
    ) -> Option<PathBuf> {
        let root = FrameExtractor::frames_root(
            self.settings.output.frames_folder.as_deref(),
            request.batch_folder.as_deref(),
            output,
        );
        match self
            .frames
            .extract(output, &root, self.settings.output.frame_interval, signal)
            .await
        {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!(error = %e, "Frame extraction failed");
                warnings.push(format!("Frame extraction failed: {}", e));
                None
            }
        }
    }

    fn check_input(input: &Path) -> Result<(), DomainError> {
        if input.is_file() {
            Ok(())
        } else {
            Err(DomainError::FsFail(format!(
                "Input file does not exist: {}",
                input.display()
            )))
        }
    }

    /// Private temp directory for one file's segments
    fn create_workspace(input: &Path, ctx: &RunContext) -> Result<TempDir, DomainError> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let prefix = format!("autocut_{}_", stem);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let workspace = match ctx.temp_root() {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        workspace.map_err(|e| DomainError::FsFail(format!("Failed to create temp workspace: {}", e)))
    }
}
