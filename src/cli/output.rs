//! CLI output formatting

use crate::{
    core::{RunReport, RunStatus, Step, StepOutcome},
    execution::RunEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the plan's steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Aborted => style("ABORTED").red().to_string(),
    }
}

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted {
            run_id,
            total_steps,
        } => format!(
            "{} Provisioning run {} ({} steps)",
            ROCKET,
            style(&run_id.to_string()[..8]).dim(),
            style(total_steps).cyan()
        ),
        RunEvent::StepStarted {
            name,
            ordinal,
            total_steps,
        } => format!(
            "{} [{}/{}] {}",
            SPINNER,
            ordinal,
            total_steps,
            style(name).cyan()
        ),
        RunEvent::StepCompleted { name, note } => match note {
            Some(note) => format!(
                "{} {} ({})",
                CHECK,
                style(name).green(),
                style(note).dim()
            ),
            None => format!("{} {}", CHECK, style(name).green()),
        },
        RunEvent::StepSkipped { name, reason } => format!(
            "{} {} skipped: {}",
            INFO,
            style(name).yellow(),
            style(reason).dim()
        ),
        RunEvent::StepWarned { name, error } => format!(
            "{} {} failed (continuing): {}",
            WARN,
            style(name).yellow(),
            style(error).dim()
        ),
        RunEvent::StepFailed { name, error } => {
            format!("{} {}: {}", CROSS, style(name).red(), style(error).dim())
        }
        RunEvent::RunFinished { run_id, status } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Format one plan row for the `plan` command
pub fn format_plan_row(step: &Step) -> String {
    let fatality = if step.fatal {
        style("fatal").red().to_string()
    } else {
        style("non-fatal").dim().to_string()
    };
    let idempotence = if step.idempotent {
        style("idempotent").dim().to_string()
    } else {
        style("single-shot").yellow().to_string()
    };
    let gate = if step.confirm { " [confirm]" } else { "" };

    format!(
        "  {:>2}. {:<32} {} / {}{}",
        step.ordinal,
        style(step.name).bold(),
        fatality,
        idempotence,
        gate
    )
}

/// Format the final run summary
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::with_capacity(report.records.len() + 1);

    for record in &report.records {
        let line = match &record.outcome {
            StepOutcome::Succeeded { note: Some(note) } => format!(
                "  {} {} ({})",
                CHECK,
                style(record.name).green(),
                style(note).dim()
            ),
            StepOutcome::Succeeded { note: None } => {
                format!("  {} {}", CHECK, style(record.name).green())
            }
            StepOutcome::Skipped { reason } => format!(
                "  {} {} skipped: {}",
                INFO,
                style(record.name).yellow(),
                style(reason).dim()
            ),
            StepOutcome::Failed { error } => format!(
                "  {} {}: {}",
                CROSS,
                style(record.name).red(),
                style(error).dim()
            ),
        };
        lines.push(line);
    }

    lines.push(format!(
        "  {} / {} steps, status {}",
        report.records.len(),
        report.state.total_steps,
        format_status(report.state.status)
    ));

    lines.join("\n")
}
