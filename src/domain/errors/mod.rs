// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// File system operation failed
    FsFail(String),
    /// External tool could not be located
    ToolMissing(String),
    /// Silence analysis failed (tool missing, non-zero exit, unparseable output)
    DetectionFailure(String),
    /// Planning left nothing to keep
    EmptyPlan(String),
    /// Extraction of one kept span failed
    CutFailure { index: usize, message: String },
    /// Concatenation or crossfade failed, including after the re-encode retry
    CompositionFailure(String),
    /// Trailing fade-out failed; callers keep the unfaded output
    FadeFailure(String),
    /// The run was cancelled
    Cancelled,
    /// Processing error
    ProcessingError(String),
}

impl DomainError {
    /// Whether the error aborts the current file's pipeline
    pub fn is_fatal_for_file(&self) -> bool {
        !matches!(self, DomainError::FadeFailure(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::ToolMissing(msg) => write!(f, "Tool missing: {}", msg),
            DomainError::DetectionFailure(msg) => write!(f, "Silence detection failed: {}", msg),
            DomainError::EmptyPlan(msg) => write!(f, "Nothing to keep: {}", msg),
            DomainError::CutFailure { index, message } => {
                write!(f, "Cutting segment {} failed: {}", index, message)
            }
            DomainError::CompositionFailure(msg) => write!(f, "Composition failed: {}", msg),
            DomainError::FadeFailure(msg) => write!(f, "Fade-out failed: {}", msg),
            DomainError::Cancelled => write!(f, "Cancelled by user"),
            DomainError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
