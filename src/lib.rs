//! AutoCut CLI Library
//!
//! Detects silence in a video with ffmpeg, turns it into an edit plan of kept
//! spans, cuts those spans into segments and joins them back together with
//! hard cuts or a chained crossfade.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::context::{CancelHandle, CancelSignal, RunContext};
pub use domain::errors::DomainError;
pub use domain::model::{BatchReport, BatchStatus, CutReport, EditPlan, SilenceReport, TimeSpan};
pub use error::{AutoCutError, AutoCutResult};
