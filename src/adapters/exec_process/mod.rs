//! Process execution adapter
//!
//! Runs ffmpeg/ffprobe through `tokio::process`, capturing both output
//! streams and racing the child against the run's cancellation signal.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::context::CancelSignal;
use crate::domain::errors::*;
use crate::ports::*;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Process-based execution adapter
#[derive(Debug, Default, Clone)]
pub struct ProcessExecAdapter;

impl ProcessExecAdapter {
    /// Create new process execution adapter
    pub fn new() -> Self {
        Self
    }

    fn build_command(invocation: &ToolInvocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }
}

#[async_trait]
impl ExecutePort for ProcessExecAdapter {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        cancel: &CancelSignal,
    ) -> Result<ToolOutput, DomainError> {
        cancel.checkpoint()?;
        debug!(command = %invocation.rendered(), "Running external tool");

        let child = Self::build_command(invocation).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                DomainError::ToolMissing(format!(
                    "{} could not be started: {}",
                    invocation.program.display(),
                    e
                ))
            } else {
                DomainError::ProcessingError(format!(
                    "Failed to start {}: {}",
                    invocation.program.display(),
                    e
                ))
            }
        })?;

        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|e| {
                    DomainError::ProcessingError(format!(
                        "Failed waiting for {}: {}",
                        invocation.program.display(),
                        e
                    ))
                })?;
                let result = ToolOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                if !result.success() {
                    debug!(
                        command = %invocation.rendered(),
                        diagnostics = %result.diagnostics(5),
                        "External tool exited unsuccessfully"
                    );
                }
                Ok(result)
            }
            _ = cancel.cancelled() => {
                // The child future is dropped here; kill_on_drop terminates the process.
                warn!(program = %invocation.program.display(), "Cancellation requested, terminating tool");
                Err(DomainError::Cancelled)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::context::RunContext;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> ToolInvocation {
        ToolInvocation::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_captures_exit_code_and_streams() {
        let ctx = RunContext::new();
        let output = ProcessExecAdapter::new()
            .run(&sh("echo out; echo err 1>&2; exit 3"), ctx.signal())
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_missing() {
        let ctx = RunContext::new();
        let invocation = ToolInvocation::new("/definitely/not/a/real/ffmpeg", Vec::new());
        let err = ProcessExecAdapter::new()
            .run(&invocation, ctx.signal())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ToolMissing(_)));
    }

    #[tokio::test]
    async fn test_cancel_kills_running_process() {
        let ctx = RunContext::new();
        let handle = ctx.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let started = Instant::now();
        let err = ProcessExecAdapter::new()
            .run(&sh("sleep 10"), ctx.signal())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_spawn() {
        let ctx = RunContext::new();
        ctx.cancel_handle().cancel();
        let err = ProcessExecAdapter::new()
            .run(&sh("exit 0"), ctx.signal())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::Cancelled);
    }
}
