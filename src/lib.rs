//! # Covid Pulse
//!
//! COVID-19 Pulse - A terminal dashboard and metrics library for country-level
//! case, death and vaccination time series.
//!
//! ## Features
//!
//! - **Rolling averages**: Trailing-window smoothing that skips missing values
//! - **Period summaries**: Latest totals and first-to-last deltas per region
//! - **API client**: Async client for the COVID-19 data REST API with retries
//! - **Dashboard**: Reducer-driven view state with cards, charts and tables
//!
//! ## Modules
//!
//! - [`metrics`]: Pure derived-metrics engine
//! - [`api`]: Client for the external data API
//! - [`dashboard`]: Presentation layer
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_pulse::api::{ClientConfig, CovidApiClient, DataSource, TimeseriesQuery};
//! use covid_pulse::metrics::{Metric, DEFAULT_WINDOW};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CovidApiClient::new(ClientConfig::default())?;
//!
//!     // Fetch one country's series
//!     let series = client.timeseries("USA", TimeseriesQuery::new()).await?;
//!
//!     // Derive chart data and the summary cards
//!     let smoothed = series.rolling_average(Metric::ConfirmedCases, DEFAULT_WINDOW)?;
//!     if let Some(summary) = series.summarize(series.name()) {
//!         println!("{}: {} new cases", summary.label, summary.new_cases());
//!     }
//!
//!     println!("{} smoothed records", smoothed.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod metrics;

// Re-export top-level types for convenience
pub use metrics::{
    rolling_average, smooth_all, summarize, DailyRecord, Metric, MetricTotals, MetricsError,
    MetricsResult, PeriodSummary, SmoothedRecord, TimeSeries, DEFAULT_WINDOW,
};

pub use api::{
    ClientConfig, ClientError, ClientResult, Country, CovidApiClient, DataSource, GlobalSummary,
    TimeseriesQuery,
};

pub use dashboard::{
    CounterAnimation, CountryReport, CountryView, Dashboard, DashboardSettings, ViewAction,
    ViewState,
};

pub use config::{ApiConfig, Config, ConfigError, DashboardConfig, LoggingConfig};
