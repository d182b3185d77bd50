use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fludash::{
    dashboard::Dashboard,
    fetch::{ApiSource, HttpTransport, MetricSource},
    plot::Selection,
    reshape::reshape,
    snapshot::{load_snapshot, save_snapshot},
    DashboardConfig, Dataset,
};
use std::{env, io, path::PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Influenza surveillance dashboard")]
struct Args {
    /// YAML config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overrides LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a dataset and store it as a snapshot
    Fetch {
        /// Dataset to fetch; all of them when omitted
        #[arg(value_enum)]
        dataset: Option<Dataset>,
    },
    /// Draw charts from the stored snapshots
    Render {
        #[arg(value_enum)]
        dataset: Option<Dataset>,
        /// Year to show (repeatable); the latest year when omitted
        #[arg(long = "year")]
        years: Vec<i32>,
        /// Age group to show (repeatable); every group except `all` when omitted
        #[arg(long = "age")]
        ages: Vec<String>,
    },
    /// Load snapshots, refresh them from the API and redraw
    Refresh {
        #[arg(value_enum)]
        dataset: Option<Dataset>,
    },
    /// Print a snapshot's reshaped table
    Table {
        #[arg(value_enum)]
        dataset: Dataset,
    },
}

fn datasets(choice: Option<Dataset>) -> Vec<Dataset> {
    choice.map_or_else(|| Dataset::ALL.to_vec(), |d| vec![d])
}

fn api_source(config: &DashboardConfig) -> Result<ApiSource<HttpTransport>> {
    let transport =
        HttpTransport::new(config.request_timeout()).context("building http client")?;
    Ok(ApiSource::new(
        config.metric.clone(),
        config.api_host.clone(),
        transport,
        config.rate_limiter(),
    ))
}

/// `RUST_LOG` directives, defaulting to `info`; an explicit level is added on
/// top and sets the global level.
fn env_filter(level: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    match (level, rust_log) {
        (None, None) => EnvFilter::new("info"),
        (None, Some(directives)) => EnvFilter::new(directives),
        (Some(level), directives) => EnvFilter::new(directives.unwrap_or_default())
            .add_directive(level.parse().unwrap_or(Level::INFO.into())),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ─── logging ─────────────────────────────────────────────────────
    let log_level = args.log_level.clone().or_else(|| env::var("LOG_LEVEL").ok());
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    fmt()
        .with_env_filter(env_filter(log_level.as_deref(), rust_log.as_deref()))
        .with_writer(io::stderr)
        .init();

    let config = DashboardConfig::load(args.config.as_deref())?;
    info!(host = %config.api_host, "startup");

    match args.command {
        Command::Fetch { dataset } => {
            let source = api_source(&config)?;
            for dataset in datasets(dataset) {
                let records = source
                    .fetch(dataset.metric())
                    .with_context(|| format!("fetching {}", dataset))?;
                let path = config.snapshot_dir.join(dataset.snapshot_file());
                save_snapshot(&path, &records)?;
                println!("{}: {} records -> {}", dataset, records.len(), path.display());
            }
        }

        Command::Render {
            dataset,
            years,
            ages,
        } => {
            let mut dash = Dashboard::from_snapshots(&config, &datasets(dataset))?;
            for dataset in datasets(dataset) {
                let Some(panel) = dash.panel_mut(dataset) else {
                    continue;
                };
                if !years.is_empty() || !ages.is_empty() {
                    let current = panel.selection().clone();
                    panel.select(Selection {
                        years: if years.is_empty() {
                            current.years
                        } else {
                            years.iter().copied().collect()
                        },
                        age_groups: if ages.is_empty() {
                            current.age_groups
                        } else {
                            ages.clone()
                        },
                    });
                }
            }
            for path in dash.write_all(&config.output_dir)? {
                println!("{}", path.display());
            }
        }

        Command::Refresh { dataset } => {
            let chosen = datasets(dataset);
            let mut dash = Dashboard::from_snapshots(&config, &chosen)?;
            let source = api_source(&config)?;

            let mut failed = 0;
            for &dataset in &chosen {
                match dash.refresh(dataset, &source) {
                    Ok(charts) => info!(
                        %dataset,
                        points = charts.aggregate.point_count(),
                        "redrawn"
                    ),
                    Err(err) => {
                        error!(%dataset, error = %err, "refresh failed");
                        failed += 1;
                    }
                }
            }

            for panel in dash.panels() {
                println!("{}: {}", panel.dataset(), panel.status().indicator());
            }
            dash.write_all(&config.output_dir)?;

            if failed > 0 {
                bail!("{} of {} refreshes failed", failed, chosen.len());
            }
        }

        Command::Table { dataset } => {
            let path = config.snapshot_dir.join(dataset.snapshot_file());
            let records = load_snapshot(&path)?;
            let table = reshape(&records, &config.label_aliases)
                .with_context(|| format!("reshaping {}", path.display()))?;
            table.write_csv(io::stdout().lock())?;
        }
    }

    info!("all done");
    Ok(())
}
