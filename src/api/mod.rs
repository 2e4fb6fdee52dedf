//! Data API Integration
//!
//! Talks to the external COVID-19 REST API that owns the data.
//!
//! ## Endpoints
//!
//! - `GET /countries` - Region list
//! - `GET /summary` - Global totals for a date
//! - `GET /countries/{iso3}/timeseries` - Daily series for one region
//! - `GET /metrics`, `GET /dates` - Dataset metadata
//! - `GET /health` - Server health (outside the versioned prefix)

mod client;
mod dto;
mod error;

pub use client::{ClientConfig, CovidApiClient, DataSource};
pub use dto::{
    Country, DateRange, GlobalSummary, HealthResponse, MetricCatalog, TimeseriesQuery,
    TimeseriesResponse,
};
pub use error::{ClientError, ClientResult};
