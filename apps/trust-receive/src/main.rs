//! trust-receive - content report consistency checker
//!
//! Batch front end for the verification engine: reads JSON-lines reports,
//! verifies each one and writes one JSON result per line to stdout. Logs go
//! to stderr.

mod batch;
mod cli;
mod error;
mod logging;
mod output;
mod setup;

use crate::cli::{BackendArg, Cli};
use crate::error::CliError;
use crate::setup::Components;
use clap::Parser;
use std::process;
use tokio::io::BufReader;
use tr_config::{Config, StoreBackend};
use tr_events::{AppEvent, EventEmitter, GeneralEvent};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.json, cli.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting trust-receive v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);
    config.validate()?;

    let (event_sender, event_receiver) = tr_events::channel();
    let event_task = tokio::spawn(logging::forward_events(event_receiver));

    let components = Components::build(&config, event_sender.clone()).await?;

    event_sender.emit(AppEvent::General(GeneralEvent::OperationStarted {
        operation: "verify batch".to_string(),
    }));

    let print = |result: &output::ReportResult| -> Result<(), CliError> {
        let line = serde_json::to_string(result).map_err(tr_errors::Error::from)?;
        println!("{line}");
        Ok(())
    };

    let summary = match cli.input_path() {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            batch::process_lines(&components.engine, BufReader::new(file), print).await
        }
        None => {
            batch::process_lines(&components.engine, BufReader::new(tokio::io::stdin()), print)
                .await
        }
    };

    event_sender.emit(AppEvent::General(GeneralEvent::OperationCompleted {
        operation: "verify batch".to_string(),
        success: summary.is_ok(),
    }));
    let summary = summary?;

    let stats = components.engine.filter_stats();
    if stats.over_capacity() {
        event_sender.emit_warning(format!(
            "membership filter holds {} keys but was sized for {}; false-positive rate is degraded",
            stats.inserted, stats.capacity
        ));
    }

    if cli.metrics {
        print!("{}", components.engine.metrics().render_prometheus());
    }
    if cli.stats {
        eprintln!(
            "{}",
            serde_json::to_string(&stats).map_err(tr_errors::Error::from)?
        );
    }

    info!(
        new = summary.new,
        confirmed = summary.confirmed,
        recovered = summary.recovered_false_positive,
        conflicts = summary.conflict,
        failed = summary.failed,
        "batch complete"
    );

    components.shutdown().await;
    drop(event_sender);
    let _ = event_task.await;
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let default_filter = if debug_enabled_flag {
        "info,trust_receive=debug,tr_verify=debug"
    } else {
        "warn,trust_receive=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(backend) = cli.backend {
        config.store.backend = match backend {
            BackendArg::Memory => StoreBackend::Memory,
            BackendArg::Sqlite => StoreBackend::Sqlite,
        };
    }
    if let Some(path) = &cli.store_path {
        config.store.path = Some(path.clone());
    }
    if let Some(prefix) = &cli.key_prefix {
        config.store.key_prefix.clone_from(prefix);
    }
    if let Some(capacity) = cli.capacity {
        config.filter.capacity = capacity;
    }
    if let Some(fp_rate) = cli.fp_rate {
        config.filter.fp_rate = fp_rate;
    }
    if let Some(deadline_ms) = cli.deadline_ms {
        config.verify.deadline_ms = Some(deadline_ms);
    }
    if let Some(command) = &cli.alert_command {
        let args: Vec<String> = command.iter().filter(|a| !a.is_empty()).cloned().collect();
        config.alert.command = Some(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_command_ignores_repeated_spaces() {
        let cli = Cli::parse_from(["trust-receive", "--alert-command", "notify  cdn-oncall "]);
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli);
        assert_eq!(
            config.alert.command,
            Some(vec!["notify".to_string(), "cdn-oncall".to_string()])
        );
    }
}
