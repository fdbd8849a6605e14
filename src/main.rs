use anyhow::{Context, Result};
use rvm_setup::cli::commands::{PlanCommand, RunCommand};
use rvm_setup::cli::output::*;
use rvm_setup::cli::{Cli, Command};
use rvm_setup::execution::{AutoConfirm, Confirmer, ProvisionRunner, RunEvent, TerminalConfirm};
use rvm_setup::host::SystemHost;
use rvm_setup::{Plan, RunOutcome};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_provision(cmd).await?,
        Command::Plan(cmd) => show_plan(cmd)?,
    }

    Ok(())
}

async fn run_provision(cmd: &RunCommand) -> Result<()> {
    let config = cmd.resolve_config()?;

    let plan = Plan::standard();
    plan.validate().context("Invalid provisioning plan")?;

    println!(
        "{} Provisioning host for {} ({}, branch {})",
        INFO,
        style("RVM").bold(),
        style(&config.repo_url).dim(),
        style(&config.branch).cyan()
    );

    let host = Arc::new(SystemHost::new(config.sources_file.clone()));
    let confirmer: Box<dyn Confirmer> = if config.assume_yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(TerminalConfirm::new(config.confirm_wait_secs))
    };

    let mut runner = ProvisionRunner::new(host, config.clone(), confirmer);

    // Progress bar over the step sequence; event lines print above it
    let progress = create_progress_bar(plan.len());
    let bar = progress.clone();
    runner.add_event_handler(move |event| {
        match &event {
            RunEvent::StepStarted { name, .. } => bar.set_message(name.to_string()),
            RunEvent::StepCompleted { .. }
            | RunEvent::StepSkipped { .. }
            | RunEvent::StepWarned { .. } => bar.inc(1),
            _ => {}
        }
        bar.println(format_run_event(&event));
    });

    let report = runner.run(&plan).await;
    progress.finish_and_clear();

    println!("\n{}", format_report(&report));

    match &report.outcome {
        RunOutcome::Completed => {
            let reboot_skipped = report
                .record("Reboot")
                .map(|r| r.skipped())
                .unwrap_or(false);
            if reboot_skipped {
                println!(
                    "\n{} Provisioning finished; {} to boot the hypervisor",
                    WARN,
                    style("reboot manually").bold()
                );
            } else {
                println!(
                    "\n{} Host provisioned {} - rebooting",
                    CHECK,
                    style("successfully").green()
                );
            }
            Ok(())
        }
        RunOutcome::Aborted { step } => {
            let detail = report
                .aborting_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            eprintln!(
                "\n{} Provisioning {} at step {}: {}",
                CROSS,
                style("aborted").red(),
                style(step).bold(),
                detail
            );
            std::process::exit(report.exit_code());
        }
    }
}

fn show_plan(cmd: &PlanCommand) -> Result<()> {
    // The config only parameterizes step actions, but loading it here
    // surfaces file errors from the same flags `run` accepts
    if let Some(path) = &cmd.config {
        rvm_setup::ProvisionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }

    let plan = Plan::standard();
    plan.validate().context("Invalid provisioning plan")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{} Provisioning plan ({} steps):", INFO, plan.len());
    for step in plan.steps() {
        println!("{}", format_plan_row(step));
    }
    println!(
        "\n{} single-shot steps are probed before they run; a matching clone is reused or rejected per --on-existing-source",
        INFO
    );

    Ok(())
}
