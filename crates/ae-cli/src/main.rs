//! Automation runner
//!
//! Loads an automation definition and an optional trigger payload, runs the
//! automation and prints the action audit tree as JSON. Exits with status 1
//! when an error escapes the top-level actions.

use ae_action::AutomationOutcome;
use ae_config::{load_automation, load_value, ActionBuilder, ActionRegistry};
use ae_core::{AutomationData, Value};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run an automation definition
#[derive(Debug, Parser)]
#[command(name = "automation", version, about)]
struct Cli {
    /// Automation definition (.json, .yaml or .yml)
    definition: PathBuf,

    /// Trigger payload (.json, .yaml or .yml)
    trigger: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = run(&cli).await?;

    let output = if cli.compact {
        serde_json::to_string(&outcome)?
    } else {
        serde_json::to_string_pretty(&outcome)?
    };
    println!("{output}");

    Ok(if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run(cli: &Cli) -> Result<AutomationOutcome> {
    let config = load_automation(&cli.definition)
        .with_context(|| format!("loading {}", cli.definition.display()))?;
    let automation = ActionBuilder::new(ActionRegistry::default())
        .build_automation(&config)
        .context("building automation")?;

    let trigger = match &cli.trigger {
        Some(path) => Value::from(
            load_value(path).with_context(|| format!("loading {}", path.display()))?,
        ),
        None => Value::object(),
    };

    let cancellation = CancellationToken::new();
    let ctx = Arc::new(AutomationData::new(trigger).with_cancellation(cancellation.clone()));
    info!(automation = %automation.name, run_id = %ctx.run_id(), "Running automation");

    let signal = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal.cancel();
        }
    });

    Ok(automation.run(&ctx).await)
}
