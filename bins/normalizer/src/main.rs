//! finnorm command line.
//!
//! Reads a trial-balance batch, runs the normalization engine and writes the
//! normalized financial view as JSON.

mod cli;
mod input;

use std::fs;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finnorm_core::currency::RateTable;
use finnorm_core::{NormalizationConfig, NormalizedViewEngine, RuleRepository};
use finnorm_shared::{AppConfig, AppError, AppResult, LoggingSettings};

use cli::Cli;
use input::NormalizerInput;

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    match run(&cli, &config) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!(code = err.error_code(), "{err}");
            eprintln!("finnorm: {err}");
            Ok(ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1)))
        }
    }
}

fn init_tracing(settings: &LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.filter.as_str().into());

    // stdout carries the view; logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            settings
                .json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!settings.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();
}

fn load_rules(cli: &Cli, config: &AppConfig) -> AppResult<RuleRepository> {
    let path = cli
        .rules
        .clone()
        .or_else(|| config.rules.path.as_ref().map(Into::into));
    let repository = match path {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .map_err(|e| AppError::Io(format!("{}: {e}", path.display())))?;
            info!(path = %path.display(), "Loading rule document");
            RuleRepository::from_json_str(&text)?
        }
        None => RuleRepository::builtin()?,
    };
    Ok(repository)
}

fn run(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let repository = load_rules(cli, config)?;
    let run_config = cli.apply(NormalizationConfig::from_app_config(config));
    let input = NormalizerInput::load(&cli.input)?;

    info!(
        input = %cli.input.display(),
        industry = %run_config.industry,
        base_currency = %run_config.base_currency,
        rows = input.transactions.len(),
        "Starting normalization run"
    );

    let rates = RateTable::new(run_config.base_currency.clone(), input.rates)?;
    let view = NormalizedViewEngine::new(&repository).generate_normalized_view(
        input.transactions,
        input.manual_adjustments,
        &run_config,
        &rates,
    )?;

    let json = if cli.compact {
        serde_json::to_string(&view)
    } else {
        serde_json::to_string_pretty(&view)
    }
    .map_err(|e| AppError::Internal(e.to_string()))?;

    match &cli.output {
        Some(path) => {
            fs::write(path, json).map_err(|e| AppError::Io(format!("{}: {e}", path.display())))?;
            info!(output = %path.display(), "Normalized view written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
