//! CLI module for AutoCut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{BatchArgs, CutArgs, EditArgs, PlanArgs, ToolArgs, ToolsArgs};

/// AutoCut
///
/// Removes silent stretches from videos by detecting silence with ffmpeg,
/// cutting the remaining spans and joining them with hard cuts or crossfades.
#[derive(Parser, Debug)]
#[command(name = "autocut")]
#[command(about = "AutoCut - cut the silence out of videos")]
#[command(version)]
pub struct Cli {
    /// Logging level or filter directive
    #[arg(long, global = true, env = "AUTOCUT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "AUTOCUT_JSON_LOGS")]
    pub json_logs: bool,

    /// Config file (TOML, or YAML for .yaml/.yml)
    #[arg(long, global = true, env = "AUTOCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove silence from one video
    Cut(CutArgs),
    /// Remove silence from every video in a folder
    Batch(BatchArgs),
    /// Show the edit plan for a video without cutting it
    Plan(PlanArgs),
    /// Show where ffmpeg and ffprobe were found
    Tools(ToolsArgs),
}

impl Commands {
    pub fn edit_args(&self) -> Option<&EditArgs> {
        match self {
            Commands::Cut(args) => Some(&args.edit),
            Commands::Batch(args) => Some(&args.edit),
            Commands::Plan(args) => Some(&args.edit),
            Commands::Tools(_) => None,
        }
    }

    pub fn tool_args(&self) -> &ToolArgs {
        match self {
            Commands::Cut(args) => &args.edit.tools,
            Commands::Batch(args) => &args.edit.tools,
            Commands::Plan(args) => &args.edit.tools,
            Commands::Tools(args) => &args.tools,
        }
    }
}
