//! stock-cli: quotes, quant reports, forecasts and scans from the terminal.
//!
//! Reads market data from `<MARKET_DATA_DIR>/<SYMBOL>.json` files.
//!
//! Usage:
//!   cargo run -p stock-cli -- quant AAPL --benchmark SPY --period 1y
//!   cargo run -p stock-cli -- predict NVDA --days 10 --method ensemble --json
//!   cargo run -p stock-cli -- scan --symbols AAPL,MSFT,GOOGL
//!   cargo run -p stock-cli -- analyst TSLA --limit 50

mod args;
mod render;

use std::sync::Arc;

use analysis_orchestrator::{AnalysisConfig, AnalysisOrchestrator, JsonFileSource};
use args::{Cli, Command, FinancialsReport};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    table: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", table(value));
    }
    Ok(())
}

async fn run(orchestrator: &AnalysisOrchestrator, cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Command::Quote { symbol } => {
            let quote = orchestrator.quote(&symbol).await?;
            emit(json, &quote, render::quote)
        }
        Command::Quant {
            symbol,
            benchmark,
            period,
        } => {
            let report = orchestrator
                .quant_analysis(&symbol, benchmark.as_deref(), period)
                .await?;
            emit(json, &report, render::quant)
        }
        Command::Predict {
            symbol,
            days,
            method,
        } => {
            let report = orchestrator.predict(&symbol, days, method).await?;
            emit(json, &report, render::prediction)
        }
        Command::Compare {
            first,
            second,
            period,
        } => {
            let comparison = orchestrator.compare(&first, &second, period).await?;
            emit(json, &comparison, render::comparison)
        }
        Command::Scan { symbols, period } => {
            let result = orchestrator.scan(symbols.as_deref(), period).await;
            emit(json, &result, render::scan)
        }
        Command::Analyst {
            symbol: Some(symbol),
            limit,
            ..
        } if symbol != "MARKET" => {
            let ratings = orchestrator.analyst_ratings(&symbol, limit as usize).await?;
            emit(json, &ratings, render::analyst_ratings)
        }
        Command::Analyst {
            days_back, symbols, ..
        } => {
            let changes = orchestrator
                .market_analyst_changes(symbols.as_deref(), days_back, Utc::now())
                .await;
            emit(json, &changes, |c| render::analyst_changes(c, days_back))
        }
        Command::History {
            symbol,
            period,
            interval,
        } => {
            let data = orchestrator.history(&symbol, period, interval).await?;
            emit(json, &data, render::history)
        }
        Command::Financials {
            symbol,
            report,
            quarterly,
        } => match report {
            FinancialsReport::Statement(kind) => {
                let statement = orchestrator
                    .financial_statement(&symbol, kind, quarterly)
                    .await?;
                emit(json, &statement, render::statement)
            }
            FinancialsReport::NextEarnings => {
                let calendar = orchestrator.next_earnings(&symbol).await?;
                emit(json, &calendar, |c| render::earnings(&symbol, c.as_ref()))
            }
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_cli=warn,analysis_orchestrator=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AnalysisConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.market_data_dir = dir;
    }
    tracing::debug!("Reading market data from {}", config.market_data_dir.display());

    let source = Arc::new(JsonFileSource::new(config.market_data_dir.clone()));
    let orchestrator = AnalysisOrchestrator::new(source, config);

    run(&orchestrator, cli).await
}
