#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pvcollect::config::{self, load_configuration};
use pvcollect::encoding::ValueKind;
use pvcollect::pipeline::{HistoryResolution, PassReport, collector_from_config};
use pvcollect::reconcile::production::HistoryPeriod;
use tracing::{Level, event};

/// Collects PV inverter histories and writes them as InfluxDB line protocol
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile a history window and write every point with its timestamp
    Backfill {
        #[arg(long)]
        start: i64,
        #[arg(long)]
        stop: i64,
        /// Metric path, the configured metric when omitted
        #[arg(long)]
        metric: Option<String>,
        /// Read the fine-resolution history
        #[arg(long)]
        fine: bool,
    },
    /// Write today, month, year and lifetime production and CO2 avoided
    Production {
        /// Unix seconds to compute the statistics at, now when omitted
        #[arg(long)]
        at: Option<i64>,
    },
    /// Write the site kWh produced per day or per month over a window
    History {
        /// day or month
        #[arg(long, default_value = "day")]
        period: HistoryPeriod,
        #[arg(long)]
        start: i64,
        #[arg(long)]
        stop: i64,
    },
    /// Write the site irradiance over a window
    Irradiance {
        #[arg(long)]
        start: i64,
        #[arg(long)]
        stop: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Points may go to stdout, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let collector = collector_from_config(&config)
        .await
        .context("Failed to create collector")?;

    let result: Result<PassReport> = match cli.command {
        Command::Backfill {
            start,
            stop,
            metric,
            fine,
        } => {
            let metric = metric.unwrap_or_else(|| config.metric.clone());
            let resolution = if fine {
                HistoryResolution::Fine
            } else {
                HistoryResolution::Coarse
            };
            let kind = if config.integer_values {
                ValueKind::Integer
            } else {
                ValueKind::Float
            };
            collector
                .history_pass(&metric, start, stop, resolution, kind)
                .await
                .with_context(|| format!("Backfill of {} failed", metric))
        }
        Command::Production { at } => collector
            .production_pass(at, config.co2_factor)
            .await
            .context("Production pass failed"),
        Command::History {
            period,
            start,
            stop,
        } => collector
            .history_period_pass(period, start, stop)
            .await
            .with_context(|| format!("History pass for {} failed", period.metric())),
        Command::Irradiance { start, stop } => collector
            .irradiance_pass(start, stop)
            .await
            .context("Irradiance pass failed"),
    };

    match result {
        Ok(report) => {
            event!(Level::INFO, "{}: {}", config.site_name, report);
            Ok(())
        }
        Err(err) => {
            event!(Level::ERROR, "{}: {:#}", config.site_name, err);
            sentry::integrations::anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}
