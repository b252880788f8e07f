//! Command-line argument definitions
//!
//! Every tuning flag is optional so that unset flags fall through to the
//! config file. `AUTOCUT_*` environment variables are read by clap and sit
//! between the flags and the file.

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

fn parse_crf(s: &str) -> Result<u8, String> {
    number_range(s, 0, 51)
}

fn parse_frame_interval(s: &str) -> Result<u32, String> {
    number_range(s, 1, 100_000)
}

fn parse_fallback_threshold(s: &str) -> Result<usize, String> {
    number_range(s, 1, 100_000)
}

/// Explicit ffmpeg/ffprobe locations
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the ffmpeg executable
    #[arg(long, env = "AUTOCUT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, env = "AUTOCUT_FFPROBE")]
    pub ffprobe: Option<PathBuf>,
}

/// Detection, planning and post-processing overrides
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Silence threshold in dB (e.g. -30)
    #[arg(long, env = "AUTOCUT_THRESHOLD_DB", allow_negative_numbers = true)]
    pub threshold_db: Option<f64>,

    /// Shortest silence, in seconds, that gets cut
    #[arg(long, env = "AUTOCUT_MIN_SILENCE")]
    pub min_silence: Option<f64>,

    /// Seconds of silence kept on each side of a cut
    #[arg(long, env = "AUTOCUT_MARGIN")]
    pub margin: Option<f64>,

    /// Kept clips shorter than this many seconds are dropped
    #[arg(long = "min-clip", env = "AUTOCUT_MIN_CLIP")]
    pub min_clip: Option<f64>,

    /// Crossfade between clips in seconds (0 = hard cuts)
    #[arg(long, env = "AUTOCUT_CROSSFADE")]
    pub crossfade: Option<f64>,

    /// Segment count above which crossfades fall back to hard cuts
    #[arg(long, env = "AUTOCUT_FALLBACK_THRESHOLD", value_parser = parse_fallback_threshold)]
    pub fallback_threshold: Option<usize>,

    /// Audio stream index used for detection
    #[arg(long, env = "AUTOCUT_AUDIO_TRACK")]
    pub audio_track: Option<usize>,

    /// Detect silence per channel instead of on the downmix
    #[arg(long)]
    pub per_channel: bool,

    /// Constant Rate Factor for re-encodes (0-51)
    #[arg(long, env = "AUTOCUT_CRF", value_parser = parse_crf)]
    pub crf: Option<u8>,

    /// Encoding preset for re-encodes
    #[arg(long, env = "AUTOCUT_PRESET")]
    pub preset: Option<String>,

    /// Write every Nth frame of each output as PNG
    #[arg(long)]
    pub extract_frames: bool,

    /// Folder that receives the per-video frame folders
    #[arg(long, env = "AUTOCUT_FRAMES_FOLDER")]
    pub frames_folder: Option<PathBuf>,

    /// Sample every Nth frame
    #[arg(long, env = "AUTOCUT_FRAME_INTERVAL", value_parser = parse_frame_interval)]
    pub frame_interval: Option<u32>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (default: <input stem>_autocut.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fade the picture to black over the last seconds
    #[arg(long)]
    pub fade_out: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub edit: EditArgs,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Folder whose media files are processed
    #[arg(short, long)]
    pub folder: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub edit: EditArgs,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub edit: EditArgs,
}

/// Arguments for the tools command
#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(flatten)]
    pub tools: ToolArgs,
}
