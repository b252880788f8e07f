//! Silence detection through FFmpeg's `silencedetect` filter
//!
//! The filter logs one `silence_start:` line when the signal drops below
//! the threshold and one `silence_end: <t> | silence_duration: <d>` line
//! when it comes back. With `mono=1` every line is prefixed by the channel
//! it belongs to, so open starts are tracked per channel and a stretch only
//! counts as silent when every channel of the track is silent.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::context::CancelSignal;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::interval::{intersect, merge};
use crate::ports::*;
use crate::utils::time::format_decimal;

const START_MARKER: &str = "silence_start:";
const END_MARKER: &str = "silence_end:";
const CHANNEL_MARKER: &str = "channel:";

/// FFmpeg-backed silence detector
pub struct FfmpegSilenceDetector {
    locator: Arc<dyn ToolLocator>,
    executor: Arc<dyn ExecutePort>,
}

impl FfmpegSilenceDetector {
    /// Create new silence detector
    pub fn new(locator: Arc<dyn ToolLocator>, executor: Arc<dyn ExecutePort>) -> Self {
        Self { locator, executor }
    }

    /// Arguments of the analysis pass; output goes to the null muxer
    pub fn build_args(file: &Path, params: &DetectionParams) -> Vec<String> {
        let mut filter = format!(
            "silencedetect=noise={}dB:d={}",
            format_decimal(params.threshold_db),
            format_decimal(params.min_silence)
        );
        if params.mode == DetectionMode::PerChannel {
            filter.push_str(":mono=1");
        }

        vec![
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-i".to_string(),
            file.display().to_string(),
            "-map".to_string(),
            format!("0:a:{}", params.audio_track),
            "-af".to_string(),
            filter,
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl SilenceDetectPort for FfmpegSilenceDetector {
    async fn detect(
        &self,
        file: &Path,
        params: &DetectionParams,
        channels: u32,
        total_duration: f64,
        cancel: &CancelSignal,
    ) -> Result<SilenceReport, DomainError> {
        let program = self.locator.locate(ExternalTool::Ffmpeg).map_err(|e| match e {
            DomainError::ToolMissing(msg) => DomainError::DetectionFailure(msg),
            other => other,
        })?;

        info!(
            file = %file.display(),
            threshold_db = params.threshold_db,
            min_silence = params.min_silence,
            "Detecting silence"
        );
        let invocation = ToolInvocation::new(program, Self::build_args(file, params));
        let output = match self.executor.run(&invocation, cancel).await {
            Ok(output) => output,
            Err(DomainError::ToolMissing(msg)) => return Err(DomainError::DetectionFailure(msg)),
            Err(e) => return Err(e),
        };
        if !output.success() {
            return Err(DomainError::DetectionFailure(format!(
                "silencedetect failed on audio track {} of {}: {}",
                params.audio_track,
                file.display(),
                output.diagnostics(10)
            )));
        }

        let report = parse_silencedetect(&output.combined(), total_duration, channels)?;
        info!(
            spans = report.len(),
            silence_seconds = report.total_silence(),
            "Detected silence"
        );
        Ok(report)
    }
}

/// Parse silencedetect log text into silence spans
///
/// End markers without a preceding start are ignored. A start left open at
/// the end of the text runs to `total_duration`. Negative starts are clamped
/// to zero and spans that end up empty are dropped.
///
/// Lines tagged with `channel:` come from per-channel analysis. Each
/// channel's spans are merged on their own and only the time silent on all
/// `channels` (or on every channel seen, if more) is reported, so a channel
/// without any silence leaves nothing silent.
pub fn parse_silencedetect(
    text: &str,
    total_duration: f64,
    channels: u32,
) -> Result<SilenceReport, DomainError> {
    let mut open: BTreeMap<u32, f64> = BTreeMap::new();
    let mut per_channel: BTreeMap<u32, Vec<(f64, f64)>> = BTreeMap::new();
    let mut tagged = false;

    for line in text.lines() {
        let channel = match marker_value(line, CHANNEL_MARKER) {
            Some(raw) => {
                tagged = true;
                raw.parse::<u32>().unwrap_or(0)
            }
            None => 0,
        };

        if let Some(raw) = marker_value(line, START_MARKER) {
            let start = parse_number(raw, line)?.max(0.0);
            open.insert(channel, start);
        } else if let Some(raw) = marker_value(line, END_MARKER) {
            let end = parse_number(raw, line)?.min(total_duration);
            if let Some(start) = open.remove(&channel) {
                per_channel.entry(channel).or_default().push((start, end));
            } else {
                debug!(line, "Ignoring silence_end without a start");
            }
        }
    }

    for (channel, start) in open {
        per_channel
            .entry(channel)
            .or_default()
            .push((start, total_duration));
    }
    for spans in per_channel.values_mut() {
        spans.retain(|(start, end)| end > start);
    }

    let spans = if tagged {
        let seen = per_channel.keys().next_back().map_or(0, |c| c + 1);
        let mut common: Option<Vec<(f64, f64)>> = None;
        for channel in 0..seen.max(channels) {
            let own = merge(per_channel.remove(&channel).unwrap_or_default());
            common = Some(match common {
                Some(acc) => intersect(&acc, &own),
                None => own,
            });
        }
        common.unwrap_or_default()
    } else {
        per_channel.into_values().flatten().collect()
    };

    Ok(SilenceReport::new(
        spans
            .into_iter()
            .filter_map(|(start, end)| TimeSpan::new(start, end).ok())
            .collect(),
    ))
}

/// Token following `marker` up to whitespace or `|`
fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let idx = line.find(marker)?;
    let rest = line[idx + marker.len()..].trim_start();
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '|')
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_number(raw: &str, line: &str) -> Result<f64, DomainError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            DomainError::DetectionFailure(format!(
                "Unparseable silencedetect value '{}' in line: {}",
                raw,
                line.trim()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{IntervalPlanner, PlannerParams};

    fn bounds(report: &SilenceReport) -> Vec<(f64, f64)> {
        report.spans().iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_parse_pairs() {
        let text = "\
[silencedetect @ 0x55d1] silence_start: 2.5
[silencedetect @ 0x55d1] silence_end: 4 | silence_duration: 1.5
frame=  100 fps=0.0 q=-0.0 size=N/A
[silencedetect @ 0x55d1] silence_start: 7.25
[silencedetect @ 0x55d1] silence_end: 8.75 | silence_duration: 1.5
";
        let report = parse_silencedetect(text, 20.0, 1).unwrap();
        assert_eq!(bounds(&report), vec![(2.5, 4.0), (7.25, 8.75)]);
    }

    #[test]
    fn test_unmatched_trailing_start_runs_to_end() {
        let text = "\
[silencedetect @ 0x1] silence_start: 1
[silencedetect @ 0x1] silence_end: 2 | silence_duration: 1
[silencedetect @ 0x1] silence_start: 9.5
";
        let report = parse_silencedetect(text, 12.0, 1).unwrap();
        assert_eq!(bounds(&report), vec![(1.0, 2.0), (9.5, 12.0)]);
    }

    #[test]
    fn test_end_without_start_is_ignored() {
        let text = "[silencedetect @ 0x1] silence_end: 3 | silence_duration: 3\n";
        let report = parse_silencedetect(text, 10.0, 1).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_negative_start_is_clamped() {
        let text = "\
[silencedetect @ 0x1] silence_start: -0.0213
[silencedetect @ 0x1] silence_end: 1.2 | silence_duration: 1.22
";
        let report = parse_silencedetect(text, 10.0, 1).unwrap();
        assert_eq!(bounds(&report), vec![(0.0, 1.2)]);
    }

    #[test]
    fn test_per_channel_lines_pair_by_channel() {
        let text = "\
[silencedetect @ 0x1] channel: 0 | silence_start: 1
[silencedetect @ 0x1] channel: 1 | silence_start: 1.5
[silencedetect @ 0x1] channel: 0 | silence_end: 3 | silence_duration: 2
[silencedetect @ 0x1] channel: 1 | silence_end: 2.5 | silence_duration: 1
[silencedetect @ 0x1] channel: 1 | silence_start: 6
[silencedetect @ 0x1] channel: 0 | silence_start: 7
";
        let report = parse_silencedetect(text, 10.0, 2).unwrap();
        assert_eq!(bounds(&report), vec![(1.5, 2.5), (7.0, 10.0)]);
    }

    #[test]
    fn test_one_quiet_channel_is_not_silence() {
        let text = "\
[silencedetect @ 0x1] channel: 0 | silence_start: 0
[silencedetect @ 0x1] channel: 0 | silence_end: 10 | silence_duration: 10
";
        let report = parse_silencedetect(text, 10.0, 2).unwrap();
        assert!(report.is_empty());

        let plan = IntervalPlanner::new(PlannerParams {
            margin: 0.0,
            min_silence: 0.0,
            min_kept: 0.0,
        })
        .plan(&report, 10.0)
        .unwrap();
        assert_eq!(plan.spans(), &[TimeSpan::new(0.0, 10.0).unwrap()]);
    }

    #[test]
    fn test_single_channel_per_channel_output() {
        let text = "\
[silencedetect @ 0x1] channel: 0 | silence_start: 2
[silencedetect @ 0x1] channel: 0 | silence_end: 4 | silence_duration: 2
";
        let report = parse_silencedetect(text, 10.0, 1).unwrap();
        assert_eq!(bounds(&report), vec![(2.0, 4.0)]);
    }

    #[test]
    fn test_garbage_value_is_detection_failure() {
        let text = "[silencedetect @ 0x1] silence_start: abc\n";
        assert!(matches!(
            parse_silencedetect(text, 10.0, 1),
            Err(DomainError::DetectionFailure(_))
        ));
    }

    #[test]
    fn test_end_clamped_to_duration() {
        let text = "\
[silencedetect @ 0x1] silence_start: 8
[silencedetect @ 0x1] silence_end: 10.02 | silence_duration: 2.02
";
        let report = parse_silencedetect(text, 10.0, 1).unwrap();
        assert_eq!(bounds(&report), vec![(8.0, 10.0)]);
    }

    #[test]
    fn test_build_args_per_channel() {
        let params = DetectionParams {
            threshold_db: -30.0,
            min_silence: 1.35,
            mode: DetectionMode::PerChannel,
            audio_track: 1,
        };
        let args = FfmpegSilenceDetector::build_args(Path::new("in.mp4"), &params);
        assert!(args.contains(&"silencedetect=noise=-30dB:d=1.35:mono=1".to_string()));
        assert!(args.contains(&"0:a:1".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }
}
