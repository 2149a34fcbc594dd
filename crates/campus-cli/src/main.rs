//! `campus` - command-line front end for the membership ledger

mod commands;

use anyhow::Context;
use campus_ledger::{LedgerConfig, MembershipLedger};
use campus_store::FileStore;
use clap::Parser;
use commands::Cli;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => LedgerConfig::load(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };

    let store = FileStore::in_dir(&cli.data_dir);
    tracing::debug!(path = %store.path().display(), "opening store");
    let ledger = MembershipLedger::try_new(Arc::new(store), config)?;

    let report = commands::execute(cli.command, &ledger).await;
    ledger.settle().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(report.success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "campus failed");
            ExitCode::FAILURE
        }
    }
}
