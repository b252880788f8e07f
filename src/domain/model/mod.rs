// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules::{NaturalKey, OutputNaming};

/// A half-open time interval in seconds, used for both silence and kept spans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    /// Create a new span, rejecting negative starts and empty or inverted ranges
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::BadArgs(format!(
                "Span bounds must be finite: {} - {}",
                start, end
            )));
        }
        if start < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Span start cannot be negative: {}",
                start
            )));
        }
        if end <= start {
            return Err(DomainError::BadArgs(format!(
                "Span end ({}) must be after start ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Length of the span in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s - {:.3}s", self.start, self.end)
    }
}

/// Silence spans reported by the analysis tool, ordered by start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SilenceReport {
    spans: Vec<TimeSpan>,
}

impl SilenceReport {
    /// Build a report; spans are put in start order regardless of how they arrived
    pub fn new(mut spans: Vec<TimeSpan>) -> Self {
        spans.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { spans }
    }

    pub fn spans(&self) -> &[TimeSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total silence reported, without any merging
    pub fn total_silence(&self) -> f64 {
        self.spans.iter().map(TimeSpan::duration).sum()
    }
}

/// Ordered, disjoint kept spans for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    spans: Vec<TimeSpan>,
    total_duration: f64,
}

impl EditPlan {
    /// Build a plan from spans the caller guarantees are ordered and disjoint
    pub(crate) fn from_ordered(spans: Vec<TimeSpan>, total_duration: f64) -> Self {
        debug_assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
        Self {
            spans,
            total_duration,
        }
    }

    pub fn spans(&self) -> &[TimeSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// An empty plan means there is nothing to keep
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Seconds of source that end up in the output (before any crossfade overlap)
    pub fn kept_duration(&self) -> f64 {
        self.spans.iter().map(TimeSpan::duration).sum()
    }

    /// Seconds of source that are cut away
    pub fn removed_duration(&self) -> f64 {
        (self.total_duration - self.kept_duration()).max(0.0)
    }
}

/// One materialised clip of a kept span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the edit plan; the only ordering downstream steps may use
    pub index: usize,
    pub source_span: TimeSpan,
    pub path: PathBuf,
}

impl Segment {
    pub fn new(index: usize, source_span: TimeSpan, path: PathBuf) -> Self {
        Self {
            index,
            source_span,
            path,
        }
    }

    pub fn duration(&self) -> f64 {
        self.source_span.duration()
    }
}

/// How segments are joined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Plain concatenation, no transition
    HardCut,
    /// Chained audio+video crossfade of the given length in seconds
    Crossfade(f64),
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionMode::HardCut => write!(f, "hard cut"),
            CompositionMode::Crossfade(d) => write!(f, "crossfade {:.2}s", d),
        }
    }
}

/// Segments plus the join mode that will be applied to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPlan {
    pub segments: Vec<Segment>,
    pub mode: CompositionMode,
    /// Crossfade was requested but the segment count forced a hard cut
    pub fallback_applied: bool,
}

/// Which channels silencedetect listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Analyse the downmixed track
    #[default]
    Mixed,
    /// Analyse every channel separately
    PerChannel,
}

impl DetectionMode {
    /// Parse detection mode from string
    pub fn parse(mode_str: &str) -> Result<Self, DomainError> {
        match mode_str.to_lowercase().as_str() {
            "mixed" => Ok(DetectionMode::Mixed),
            "per_channel" | "per-channel" | "mono" => Ok(DetectionMode::PerChannel),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid detection mode: {}. Valid modes: mixed, per_channel",
                mode_str
            ))),
        }
    }
}

/// Parameters handed to the silence-analysis tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Signal level below which audio counts as silent, in dB
    pub threshold_db: f64,
    /// Shortest silence the tool reports, in seconds
    pub min_silence: f64,
    pub mode: DetectionMode,
    /// Audio stream index within the source
    pub audio_track: usize,
}

/// What the probe learned about a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// Container duration in seconds
    pub duration: f64,
    /// Channel count of every audio stream, in stream order
    pub audio_channels: Vec<u32>,
}

impl MediaProbe {
    /// Channel count of the `track`-th audio stream, if the source has one
    pub fn channels_of(&self, track: usize) -> Option<u32> {
        self.audio_channels.get(track).copied()
    }
}

/// Terminal status of one batch input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    Succeeded { output: PathBuf },
    Failed { reason: String },
    Skipped,
    /// Never started because the run was cancelled first
    Cancelled,
}

/// One candidate input file of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub path: PathBuf,
    pub file_name: String,
    #[serde(skip)]
    pub sort_key: NaturalKey,
    /// The name already carries the completed-output marker
    pub already_processed: bool,
    pub status: BatchStatus,
}

impl BatchItem {
    /// Derive name, sort key and marker flag from `path`
    pub fn new(path: PathBuf, status: BatchStatus) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            sort_key: NaturalKey::from_name(&file_name),
            already_processed: OutputNaming::has_completed_marker(&path),
            file_name,
            path,
            status,
        }
    }
}

/// Summary of one file's pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source_duration: f64,
    pub kept_spans: Vec<TimeSpan>,
    pub mode: CompositionMode,
    pub fallback_applied: bool,
    pub faded: bool,
    pub frames_dir: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

/// What a run would do to one file, computed without cutting anything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub input: PathBuf,
    pub source_duration: f64,
    pub silences: Vec<TimeSpan>,
    pub kept_spans: Vec<TimeSpan>,
    pub kept_duration: f64,
    pub mode: CompositionMode,
    pub fallback_applied: bool,
}

/// Outcome of a batch run, items in processing (natural) order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub folder: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.status)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Succeeded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Skipped))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Cancelled))
    }
}

#[cfg(test)]
mod tests;
