//! perfpulse - A/B performance analytics from the command line
//!
//! # Usage
//! ```sh
//! cargo run -- report --tenant shop.example --days 7 --metric lcp --pretty
//! cargo run -- project --visitors 100000 --rate 2 --order-value 50 --uplift 12
//! ```
//!
//! # Environment Variables
//! - `SAMPLE_SOURCE` - `synthetic` (default) or `csv`
//! - `SAMPLE_CSV_PATH` - session export read by the csv source
//! - `HISTOGRAM_BIN_EDGES` - comma separated bin edges in milliseconds
//! - `OBSERVABILITY_ENABLED` - print Prometheus metrics after each command (default: true)
//! - `LOG_FORMAT` - `json` for structured logs on stderr

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perfpulse::application::AnalyticsService;
use perfpulse::config::AnalyticsConfig;
use perfpulse::domain::analytics::{Metric, ProjectionMode, RevenueScenario, SampleQuery};
use perfpulse::infrastructure::SourceFactory;
use perfpulse::infrastructure::observability::Metrics;
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the variant comparison payload for a tenant
    Report {
        #[arg(short, long)]
        tenant: String,

        /// Lookback window in days
        #[arg(short, long, default_value = "7")]
        days: i64,

        /// lcp, fcp or ttfb
        #[arg(short, long, default_value = "lcp")]
        metric: String,

        #[arg(long)]
        pretty: bool,

        /// Append an inverse revenue projection from the measured uplift
        #[arg(long)]
        visitors: Option<f64>,

        #[arg(long, requires = "visitors")]
        order_value: Option<f64>,
    },
    /// Project monthly revenue for a conversion uplift
    Project {
        #[arg(long, default_value = "100000")]
        visitors: f64,

        /// Conversion rate in percent
        #[arg(long, default_value = "2")]
        rate: f64,

        #[arg(long, default_value = "50")]
        order_value: f64,

        /// Uplift in percent
        #[arg(long, default_value = "12", allow_hyphen_values = true)]
        uplift: f64,

        /// Treat --rate as the already improved rate
        #[arg(long)]
        inverse: bool,

        #[arg(long)]
        pretty: bool,
    },
}

fn init_logging(json: bool) {
    // stdout carries the JSON payload, so logs go to stderr
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AnalyticsConfig::from_env()?;
    init_logging(config.observability.json_logs);
    info!("perfpulse {} starting...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let metrics = Metrics::new()?;
    let observability_enabled = config.observability.enabled;

    match cli.command {
        Commands::Report {
            tenant,
            days,
            metric,
            pretty,
            visitors,
            order_value,
        } => {
            let metric: Metric = metric.parse()?;
            let query = SampleQuery::try_last_days(tenant, days, metric)
                .context("Invalid --days")?;
            let source = SourceFactory::create_source(&config.source)?;
            let service = AnalyticsService::new(source, config).with_metrics(metrics.clone());

            let payload = service.build_payload(&query).await;
            print_json(&payload, pretty)?;

            if let Some(visitors) = visitors {
                let order_value =
                    order_value.unwrap_or(RevenueScenario::default().average_order_value);
                match service.project_observed(&payload, visitors, order_value) {
                    Some(projection) => print_json(&projection, pretty)?,
                    None => info!("No measured uplift available; skipping revenue projection"),
                }
            }
        }
        Commands::Project {
            visitors,
            rate,
            order_value,
            uplift,
            inverse,
            pretty,
        } => {
            let service = AnalyticsService::calculator(config).with_metrics(metrics.clone());

            let scenario = RevenueScenario {
                monthly_visitors: visitors,
                conversion_rate_percent: rate,
                average_order_value: order_value,
                mode: if inverse {
                    ProjectionMode::Inverse
                } else {
                    ProjectionMode::Forward
                },
                uplift_percent: uplift,
            };
            print_json(&service.project_revenue(&scenario), pretty)?;
        }
    }

    if observability_enabled {
        eprintln!("{}", metrics.render());
    }

    Ok(())
}
