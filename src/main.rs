//! Marketscope CLI
//!
//! Market movers, quotes, fundamentals and daily history from Yahoo Finance
//! and Alpha Vantage, behind a TTL snapshot cache.
//!
//! # Usage
//! ```sh
//! marketscope movers --top 10
//! marketscope quote AAPL,MSFT --json
//! MODE=mock marketscope history TSLA
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marketscope::config::Config;
use marketscope::domain::market::symbol::parse_symbol_list;
use marketscope::domain::market::{HistoricalSeries, Quote, Snapshot};
use marketscope::infrastructure::ServiceFactory;
use marketscope::infrastructure::observability::Metrics;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Market data aggregation and caching", long_about = None)]
struct Cli {
    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Top gainers and losers across the configured universe
    Movers {
        /// Entries per side (defaults to SNAPSHOT_TOP_N)
        #[arg(short, long)]
        top: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Quotes for a comma-separated symbol list
    Quote {
        symbols: String,

        #[arg(long)]
        json: bool,
    },
    /// Valuation and profile data for one symbol
    Fundamentals { symbol: String },
    /// Six months of daily bars (synthetic when upstream has none)
    History {
        symbol: String,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so --json output stays machine readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Marketscope {} starting: Mode={:?}, Universe={} symbols",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.snapshot.universe.len()
    );

    let metrics = if config.observability.metrics_enabled {
        Some(Metrics::new().context("Failed to register metrics")?)
    } else {
        None
    };
    let service = ServiceFactory::create_service(&config, metrics.clone())?;

    match cli.command {
        Commands::Movers { top, json } => {
            let snapshot = service.get_snapshot(top).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Commands::Quote { symbols, json } => {
            let symbols = parse_symbol_list(&symbols);
            if symbols.is_empty() {
                anyhow::bail!("No symbols given");
            }
            let outcomes = service.get_quotes(&symbols).await;
            if json {
                let rows: Vec<_> = outcomes
                    .iter()
                    .map(|(symbol, result)| match result {
                        Ok(quote) => json!({ "symbol": symbol, "quote": quote }),
                        Err(e) => json!({ "symbol": symbol, "error": e.to_string(), "kind": e.kind() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (symbol, result) in &outcomes {
                    match result {
                        Ok(quote) => print_quote_row(quote),
                        Err(e) => println!("{:<8} error: {}", symbol, e),
                    }
                }
            }
        }
        Commands::Fundamentals { symbol } => {
            let fundamentals = service.get_fundamentals(&symbol).await?;
            println!("{}  {} / {}", fundamentals.symbol, fundamentals.sector, fundamentals.industry);
            for (label, value) in fundamentals.display_rows() {
                println!("  {:<16} {}", label, value);
            }
        }
        Commands::History { symbol, json } => {
            let series = service.get_historical_series(&symbol).await?;
            if json {
                let body = json!({
                    "symbol": series.symbol,
                    "provenance": series.provenance.label(),
                    "points": series.points,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_history(&series);
            }
        }
    }

    if cli.metrics {
        match &metrics {
            Some(metrics) => print!("{}", metrics.render()),
            None => eprintln!("metrics disabled (METRICS_ENABLED=false)"),
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("Snapshot computed at {}", snapshot.computed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("\nTop gainers");
    for quote in &snapshot.gainers {
        print_quote_row(quote);
    }
    println!("\nTop losers");
    for quote in &snapshot.losers {
        print_quote_row(quote);
    }
}

fn print_quote_row(quote: &Quote) {
    println!(
        "{:<8} {:>10} {:>9} {:>9} {:>16} {:>20}  {}",
        quote.symbol,
        quote.price_display(),
        quote.change_display(),
        quote.change_percent_display(),
        quote.volume_display(),
        quote.market_cap_display(),
        quote.name
    );
}

fn print_history(series: &HistoricalSeries) {
    println!(
        "{} ({} points, {})",
        series.symbol,
        series.len(),
        series.provenance.label()
    );
    for p in &series.points {
        println!(
            "{}  O {:>9.2}  H {:>9.2}  L {:>9.2}  C {:>9.2}  V {:>12}",
            p.date, p.open, p.high, p.low, p.close, p.volume
        );
    }
}
