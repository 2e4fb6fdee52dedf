//! Covid Pulse CLI
//!
//! Terminal dashboard for the COVID-19 data API:
//! - List countries
//! - Show global and per-country summaries
//! - Chart and tabulate a country's series with rolling averages
//! - Check API status

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use covid_pulse::api::{CovidApiClient, GlobalSummary, TimeseriesQuery};
use covid_pulse::config::{generate_default_config, Config, LoggingConfig};
use covid_pulse::dashboard::render::{self, format_count};
use covid_pulse::dashboard::{AnimationOutcome, CounterAnimation, Dashboard, ViewState};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "covid-pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 case, death and vaccination dashboard for the terminal")]
#[command(long_about = "Covid Pulse fetches country time series from the COVID-19 data API,\nsmooths them with rolling averages and renders summary cards, charts and tables.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available countries
    Countries,

    /// Show the global summary
    Summary {
        /// Date (YYYY-MM-DD), defaults to latest
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Count up the summary cards
        #[arg(long)]
        animate: bool,
    },

    /// Show one country's summary, charts and data table
    Country {
        /// ISO3 country code (e.g., USA)
        iso3: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Rolling-average window in days
        #[arg(short, long)]
        window: Option<usize>,
        /// Rows in the data table
        #[arg(short, long)]
        rows: Option<usize>,
        /// Count up the summary cards
        #[arg(long)]
        animate: bool,
    },

    /// Global summary plus one country (default from config)
    Dashboard {
        /// ISO3 country code
        iso3: Option<String>,
    },

    /// Show API status and dataset coverage
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!("Covid Pulse v{}", env!("CARGO_PKG_VERSION"));

    let client = CovidApiClient::new(config.api.client_config())
        .context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Countries => {
            let mut dashboard = Dashboard::new(client, config.dashboard.settings());
            let countries = dashboard.load_countries().await.map_err(anyhow::Error::msg)?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(countries)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    writer.write_record(["iso3", "name"])?;
                    for country in countries {
                        writer.write_record([&country.iso3, &country.name])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => print!("{}", render::render_countries(countries)),
            }
        }

        Commands::Summary { date, animate } => {
            let dashboard = Dashboard::new(client, config.dashboard.settings());
            let summary = dashboard.global_summary(date).await.map_err(anyhow::Error::msg)?;
            print_global_summary(&summary, cli.format, animate).await?;
        }

        Commands::Country {
            iso3,
            from,
            to,
            window,
            rows,
            animate,
        } => {
            let mut settings = config.dashboard.settings();
            if let Some(window) = window {
                settings.window = window;
            }
            if let Some(rows) = rows {
                settings.table_rows = rows;
            }

            let query = TimeseriesQuery { from_date: from, to_date: to };
            let mut dashboard = Dashboard::new(client, settings);
            if let Err(message) = dashboard.load_countries().await {
                tracing::warn!("{}", message);
            }
            dashboard.select(&iso3, query).await;
            print_country(&dashboard, cli.format, None, animate).await?;
        }

        Commands::Dashboard { iso3 } => {
            check_dashboard_format(cli.format)?;
            let iso3 = iso3.unwrap_or_else(|| config.dashboard.default_country.clone());
            let mut dashboard = Dashboard::new(client, config.dashboard.settings());

            // The global cards are optional; a failure there still shows the country
            let global = match dashboard.global_summary(None).await {
                Ok(summary) => Some(summary),
                Err(message) => {
                    eprintln!("{}", message);
                    None
                }
            };
            if let (Some(summary), OutputFormat::Table) = (&global, cli.format) {
                print!("{}", render::render_global_cards(summary));
                println!();
            }

            if let Err(message) = dashboard.load_countries().await {
                eprintln!("{}", message);
            }
            dashboard.select(&iso3, TimeseriesQuery::new()).await;
            print_country(&dashboard, cli.format, global.as_ref(), false).await?;
        }

        Commands::Status => {
            let base_url = client.config().base_url.clone();
            let health = match client.health().await {
                Ok(health) => health,
                Err(e) => {
                    eprintln!("Cannot connect to the data API at {}", base_url);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Covid Pulse v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API: {}", base_url);
            println!("API Status: {}", health.status);

            match client.dates().await {
                Ok(range) => {
                    println!();
                    println!("Dataset:");
                    println!("  From: {}", range.min_date);
                    println!("  To:   {}", range.max_date);
                    println!("  Days: {}", range.total_days);
                }
                Err(e) => tracing::warn!("Date range unavailable: {}", e),
            }

            match client.metrics().await {
                Ok(metrics) => {
                    println!();
                    println!("Metrics: {}", metrics.join(", "));
                }
                Err(e) => tracing::warn!("Metric list unavailable: {}", e),
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("covid_pulse={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output, so logs go to stderr
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// The dashboard combines two tables, which a single CSV stream cannot hold
fn check_dashboard_format(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Csv {
        bail!("CSV output is not available for the dashboard command; use `summary` and `country` with --format csv");
    }
    Ok(())
}

async fn print_country(
    dashboard: &Dashboard<CovidApiClient>,
    format: OutputFormat,
    global: Option<&GlobalSummary>,
    animate: bool,
) -> anyhow::Result<()> {
    let view = match dashboard.state() {
        ViewState::Loaded { view, .. } => view,
        ViewState::Errored { message, .. } => bail!("{}", message),
        _ => bail!("No country loaded"),
    };

    match format {
        OutputFormat::Json => {
            let report = dashboard.report(global).context("No country loaded")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => print!("{}", render::render_csv(&view.smoothed)?),
        OutputFormat::Table => match &view.summary {
            Some(summary) if animate => {
                let cards = render::summary_cards(summary)
                    .into_iter()
                    .map(|(label, value, note)| (label, value, 2.5, Some(note)))
                    .collect();
                animate_cards(&render::summary_title(summary), cards).await;
                println!();
                print!("{}", dashboard.render_country_details());
            }
            _ => print!("{}", dashboard.render_country()),
        },
    }
    Ok(())
}

async fn print_global_summary(
    summary: &GlobalSummary,
    format: OutputFormat,
    animate: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.serialize(summary)?;
            writer.flush()?;
        }
        OutputFormat::Table if animate => {
            let cards = vec![
                ("Total Cases", summary.total_confirmed_cases, 2.5, None),
                ("Total Deaths", summary.total_deaths, 2.5, None),
                ("Countries Affected", summary.countries_affected as f64, 1.5, None),
                ("Total Vaccinations", summary.total_vaccinations, 2.5, None),
                ("Fully Vaccinated", summary.people_fully_vaccinated, 2.5, None),
            ];
            animate_cards(&format!("Global Summary (as of {})", summary.date), cards).await;
        }
        OutputFormat::Table => print!("{}", render::render_global_cards(summary)),
    }
    Ok(())
}

/// Count each card up from zero over its duration in seconds
///
/// Ctrl-C skips to the final values.
async fn animate_cards(title: &str, cards: Vec<(&str, f64, f64, Option<String>)>) {
    let (tx, rx) = watch::channel(false);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });

    println!("{}", title);
    println!("{}", "-".repeat(44));

    for (label, value, secs, note) in cards {
        let animation = CounterAnimation::new(0.0, Some(value), Duration::from_secs_f64(secs));
        let outcome = animation
            .run(rx.clone(), |v| {
                print!("\r  {:<20} {:>18}", label, format_count(v));
                let _ = std::io::stdout().flush();
            })
            .await;

        if outcome == AnimationOutcome::Cancelled {
            tracing::debug!(label, "Animation cancelled");
        }
        let final_value = format_count(animation.target());
        match note {
            Some(note) => println!("\r  {:<20} {:>18}  {}", label, final_value, note),
            None => println!("\r  {:<20} {:>18}", label, final_value),
        }
    }

    interrupt.abort();
}
