// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::context::CancelSignal;
use crate::domain::errors::*;
use crate::domain::model::*;

/// External command-line tools the pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalTool {
    Ffmpeg,
    Ffprobe,
}

impl ExternalTool {
    /// Executable name looked up on PATH
    pub fn program_name(&self) -> &'static str {
        match self {
            ExternalTool::Ffmpeg => "ffmpeg",
            ExternalTool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for ExternalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program_name())
    }
}

/// Port for finding external tools
///
/// Only reports where a tool lives; installing missing tools is not its job.
pub trait ToolLocator: Send + Sync {
    /// Resolve the executable for `tool`, or [`DomainError::ToolMissing`]
    fn locate(&self, tool: ExternalTool) -> Result<PathBuf, DomainError>;
}

/// One external process invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Command line for logs
    pub fn rendered(&self) -> String {
        format!("{} {}", self.program.display(), self.args.join(" "))
    }

    /// Last argument, which is the output target for every ffmpeg call we make
    pub fn output_arg(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Tail of the diagnostic stream, for error messages
    pub fn diagnostics(&self, max_lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(max_lines);
        let tail = lines[start..].join("\n");
        match self.exit_code {
            Some(code) => format!("exit code {}: {}", code, tail),
            None => format!("terminated by signal: {}", tail),
        }
    }

    /// stdout and stderr together, for parsers that accept either stream
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        text.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }
}

/// Port for running external processes
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run to completion and capture output
    ///
    /// A non-zero exit is reported through [`ToolOutput::exit_code`], not as
    /// an error; callers decide which failure kind it means. When `cancel`
    /// fires the process is killed and [`DomainError::Cancelled`] returned.
    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancelSignal,
    ) -> Result<ToolOutput, DomainError>;
}

/// Port for media probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration and audio layout of `file`
    async fn probe(&self, file: &Path, cancel: &CancelSignal) -> Result<MediaProbe, DomainError>;

    /// Container duration in seconds
    async fn probe_duration(&self, file: &Path, cancel: &CancelSignal) -> Result<f64, DomainError> {
        Ok(self.probe(file, cancel).await?.duration)
    }
}

/// Port for silence analysis
#[async_trait]
pub trait SilenceDetectPort: Send + Sync {
    /// Silence spans of `file`; an unmatched trailing start runs to `total_duration`
    ///
    /// `channels` is the channel count of the analysed track. In per-channel
    /// mode a stretch is silent only when all of them are.
    async fn detect(
        &self,
        file: &Path,
        params: &DetectionParams,
        channels: u32,
        total_duration: f64,
        cancel: &CancelSignal,
    ) -> Result<SilenceReport, DomainError>;
}
