// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use std::io::Write;
use std::process::ExitCode;

use bandix_monitor::{
    Cli, Config, OutputFormat, Result, collect, render_json, render_json_error, render_table,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads BANDIX_* variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_tracing(cli.debug);

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Loaded configuration: {:?}", config);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::debug!("Error details: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Collects once and prints the result in the configured format
async fn run(config: &Config) -> Result<()> {
    let result = collect(&config.collect_options()).await;

    let mut stdout = std::io::stdout().lock();
    match (result, config.format) {
        (Ok(set), OutputFormat::Table) => write!(stdout, "{}", render_table(&set))?,
        (Ok(set), OutputFormat::Json) => writeln!(stdout, "{}", render_json(&set)?)?,
        (Err(e), OutputFormat::Json) => {
            writeln!(stdout, "{}", render_json_error())?;
            return Err(e.into());
        }
        (Err(e), OutputFormat::Table) => return Err(e.into()),
    }
    Ok(())
}

/// Filter used when `RUST_LOG` is unset; `--debug` raises this crate to debug
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "info,bandix_monitor=debug"
    } else {
        "info"
    }
}

fn setup_tracing(debug: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
