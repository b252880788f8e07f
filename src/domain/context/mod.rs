//! Per-run context and cancellation
//!
//! A [`RunContext`] is created for one invocation (a single file or a whole
//! batch) and handed down to every step. Cancellation has exactly one entry
//! point, [`CancelHandle::cancel`]; steps observe it through a cloned
//! [`CancelSignal`], either by polling [`CancelSignal::checkpoint`] between
//! steps or by awaiting [`CancelSignal::cancelled`] next to a running tool.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::errors::DomainError;

/// Owned state of one run
#[derive(Debug)]
pub struct RunContext {
    handle: CancelHandle,
    signal: CancelSignal,
    temp_root: Option<PathBuf>,
}

impl RunContext {
    /// Create a new, not yet cancelled context
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            handle: CancelHandle { tx: Arc::new(tx) },
            signal: CancelSignal { rx },
            temp_root: None,
        }
    }

    /// Place per-file temp workspaces under `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Handle that cancels this run
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Signal observed by the pipeline steps
    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    pub fn temp_root(&self) -> Option<&PathBuf> {
        self.temp_root.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The single way to cancel a run
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Read side of the cancellation flag
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Fail with [`DomainError::Cancelled`] once cancellation was requested
    pub fn checkpoint(&self) -> Result<(), DomainError> {
        if self.is_cancelled() {
            Err(DomainError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve once cancellation is requested
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling: never resolves.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_context_is_not_cancelled() {
        let ctx = RunContext::new();
        assert!(!ctx.is_cancelled());
        assert!(ctx.signal().checkpoint().is_ok());
    }

    #[test]
    fn test_cancel_is_observed_by_clones() {
        let ctx = RunContext::new();
        let signal = ctx.signal().clone();
        ctx.cancel_handle().cancel();
        assert!(signal.is_cancelled());
        assert_eq!(signal.checkpoint(), Err(DomainError::Cancelled));
    }

    #[test]
    fn test_cancel_twice_is_harmless() {
        let ctx = RunContext::new();
        let handle = ctx.cancel_handle();
        handle.cancel();
        handle.cancel();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves_after_cancel() {
        let ctx = RunContext::new();
        let handle = ctx.cancel_handle();
        let signal = ctx.signal().clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        tokio::time::timeout(Duration::from_secs(2), signal.cancelled())
            .await
            .expect("cancellation should be observed");
    }

    #[tokio::test]
    async fn test_cancelled_future_pending_without_cancel() {
        let ctx = RunContext::new();
        let result =
            tokio::time::timeout(Duration::from_millis(30), ctx.signal().cancelled()).await;
        assert!(result.is_err());
    }
}
