//! Command implementations

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::{AppContainer, CutRequest};
use crate::cli::args::{BatchArgs, CutArgs, PlanArgs, ToolsArgs};
use crate::domain::context::RunContext;
use crate::domain::errors::DomainError;
use crate::domain::model::{BatchReport, BatchStatus, CutReport, PlanReport};
use crate::ports::ExternalTool;
use crate::utils::time::format_timestamp;
use crate::utils::Utils;

/// Exit code used when the run was interrupted
pub const EXIT_CANCELLED: u8 = 130;

/// Execute the cut command
pub async fn cut(container: &dyn AppContainer, args: &CutArgs, ctx: &RunContext) -> Result<ExitCode> {
    let request = CutRequest::new(&args.input)
        .with_output(args.output.clone())
        .with_fade_out(args.fade_out);

    let report = container
        .autocut_interactor()
        .process_file(&request, ctx)
        .await
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize cut report")?
        );
    } else {
        display_cut_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute the batch command
pub async fn batch(container: &dyn AppContainer, args: &BatchArgs, ctx: &RunContext) -> Result<ExitCode> {
    let report = container
        .batch_interactor()
        .run(&args.folder, ctx)
        .await
        .with_context(|| format!("Failed to process folder {}", args.folder.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize batch report")?
        );
    } else {
        display_batch_report(&report);
    }

    if ctx.is_cancelled() {
        Ok(ExitCode::from(EXIT_CANCELLED))
    } else if report.failed() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: &PlanArgs, ctx: &RunContext) -> Result<ExitCode> {
    let report = container
        .autocut_interactor()
        .plan_file(&args.input, ctx)
        .await
        .with_context(|| format!("Failed to plan {}", args.input.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize plan")?
        );
    } else {
        display_plan_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute the tools command
pub async fn tools(container: &dyn AppContainer, _args: &ToolsArgs) -> Result<ExitCode> {
    let locator = container.tool_locator();
    let mut missing = 0;

    for tool in [ExternalTool::Ffmpeg, ExternalTool::Ffprobe] {
        match locator.locate(tool) {
            Ok(path) => println!("{:<8} {}", tool, path.display()),
            Err(e) => {
                missing += 1;
                println!("{:<8} missing ({})", tool, e);
            }
        }
    }

    info!(missing, "Tool lookup finished");
    Ok(if missing == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Whether an error chain ends in a user cancellation
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<DomainError>(), Some(DomainError::Cancelled)))
}

fn display_cut_report(report: &CutReport) {
    let kept: f64 = report.kept_spans.iter().map(|s| s.duration()).sum();
    println!("AutoCut Result");
    println!("==============");
    println!("Input:    {}", report.input.display());
    println!("Output:   {}", report.output.display());
    println!(
        "Kept:     {} spans, {:.2}s of {:.2}s ({:.1}%)",
        report.kept_spans.len(),
        kept,
        report.source_duration,
        Utils::percentage(kept, report.source_duration)
    );
    if report.fallback_applied {
        println!("Mode:     {} (crossfade skipped: too many segments)", report.mode);
    } else {
        println!("Mode:     {}", report.mode);
    }
    println!("Fade-out: {}", if report.faded { "yes" } else { "no" });
    if let Some(dir) = &report.frames_dir {
        println!("Frames:   {}", dir.display());
    }
    for warning in &report.warnings {
        println!("Warning:  {}", warning);
    }
    println!("Elapsed:  {}", Utils::format_duration(report.elapsed));
}

fn display_batch_report(report: &BatchReport) {
    println!("Batch: {}", report.folder.display());
    println!("======");
    for item in &report.items {
        match &item.status {
            BatchStatus::Succeeded { output } => {
                println!("  [ok]        {} -> {}", item.file_name, output.display())
            }
            BatchStatus::Failed { reason } => println!("  [failed]    {}: {}", item.file_name, reason),
            BatchStatus::Skipped => println!("  [skipped]   {}", item.file_name),
            BatchStatus::Cancelled => println!("  [cancelled] {}", item.file_name),
        }
    }

    let elapsed = (report.finished_at - report.started_at)
        .to_std()
        .unwrap_or_default();
    println!();
    println!(
        "{} succeeded, {} failed, {} skipped, {} cancelled in {}",
        report.succeeded(),
        report.failed(),
        report.skipped(),
        report.cancelled(),
        Utils::format_duration(elapsed)
    );
}

fn display_plan_report(report: &PlanReport) {
    println!("Edit Plan");
    println!("=========");
    println!("File:     {}", report.input.display());
    println!("Duration: {}", format_timestamp(report.source_duration));
    println!("Silences: {}", report.silences.len());
    println!(
        "Kept:     {} spans, {} ({:.1}%)",
        report.kept_spans.len(),
        format_timestamp(report.kept_duration),
        Utils::percentage(report.kept_duration, report.source_duration)
    );
    if report.fallback_applied {
        println!("Mode:     {} (crossfade skipped: too many segments)", report.mode);
    } else {
        println!("Mode:     {}", report.mode);
    }
    println!();
    for (index, span) in report.kept_spans.iter().enumerate() {
        println!(
            "  {:>4}  {} - {}  ({:.2}s)",
            index,
            format_timestamp(span.start),
            format_timestamp(span.end),
            span.duration()
        );
    }
}
