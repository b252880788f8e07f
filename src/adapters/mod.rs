// Adapters - External system implementations

pub mod exec_process;
pub mod probe_ffprobe;
pub mod silence_ffmpeg;
pub mod tool_locator;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_process::ProcessExecAdapter;
pub use probe_ffprobe::FfprobeAdapter;
pub use silence_ffmpeg::FfmpegSilenceDetector;
pub use tool_locator::WhichToolLocator;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
