//! COVID-19 Data API Client
//!
//! HTTP client for the external REST API that serves country lists, global
//! summaries and per-country time series.

use super::dto::{
    Country, DateRange, ErrorDetail, GlobalSummary, HealthResponse, MetricCatalog,
    TimeseriesQuery, TimeseriesResponse,
};
use super::error::{ClientError, ClientResult};
use crate::metrics::TimeSeries;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Anything the dashboard can load data from
#[async_trait]
pub trait DataSource: Send + Sync {
    /// All regions, sorted by name
    async fn countries(&self) -> ClientResult<Vec<Country>>;

    /// Global totals for a date (latest when `None`)
    async fn global_summary(&self, date: Option<NaiveDate>) -> ClientResult<GlobalSummary>;

    /// Daily series for one region
    async fn timeseries(&self, iso3: &str, query: TimeseriesQuery) -> ClientResult<TimeSeries>;
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the version prefix (e.g., "http://localhost:8000/api/v1")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Retries after the first attempt; 0 sends each request once
    pub max_retries: u32,
    /// Backoff unit; attempt `n` waits `n² × retry_backoff_ms`
    pub retry_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            request_timeout_ms: 10_000,
            max_retries: 3,
            retry_backoff_ms: 1_000,
        }
    }
}

/// COVID-19 data API client
pub struct CovidApiClient {
    client: Client,
    config: ClientConfig,
}

impl CovidApiClient {
    /// Create a new client with the given configuration
    pub fn new(mut config: ClientConfig) -> ClientResult<Self> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Server root; the health endpoint lives outside the versioned prefix
    fn server_root(&self) -> &str {
        self.config
            .base_url
            .strip_suffix("/api/v1")
            .unwrap_or(&self.config.base_url)
    }

    /// Check if the API is up
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = format!("{}/health", self.server_root());
        self.get_json(&url, &[]).await
    }

    /// Metric names the dataset carries
    pub async fn metrics(&self) -> ClientResult<Vec<String>> {
        let catalog: MetricCatalog = self.get_json(&self.url("/metrics"), &[]).await?;
        Ok(catalog.metrics)
    }

    /// Date range covered by the dataset
    pub async fn dates(&self) -> ClientResult<DateRange> {
        self.get_json(&self.url("/dates"), &[]).await
    }

    /// Wait before retry number `attempt`: 1, 4, 9... backoff units
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let units = u64::from(attempt).saturating_mul(u64::from(attempt));
        Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(units))
    }

    /// Send a GET request with retry logic and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        let mut last_error = ClientError::Unavailable;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.backoff_delay(attempt)).await;
            }

            tracing::debug!(url, attempt, "GET");

            let error = match self.client.get(url).query(query).send().await {
                Ok(response) if response.status().is_success() => {
                    let body = response.bytes().await?;
                    return Ok(serde_json::from_slice(&body)?);
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ErrorDetail>(&text)
                        .map(|e| e.detail)
                        .unwrap_or(text);

                    if status == StatusCode::NOT_FOUND {
                        return Err(ClientError::NotFound(message));
                    }
                    ClientError::Api {
                        status: status.as_u16(),
                        message,
                    }
                }
                Err(e) => ClientError::from(e),
            };

            if !error.is_transient() {
                return Err(error);
            }

            tracing::warn!(url, attempt, error = %error, "Request failed");
            last_error = error;
        }

        Err(last_error)
    }
}

#[async_trait]
impl DataSource for CovidApiClient {
    async fn countries(&self) -> ClientResult<Vec<Country>> {
        let countries: Vec<Country> = self.get_json(&self.url("/countries"), &[]).await?;
        tracing::info!(count = countries.len(), "Loaded countries");
        Ok(countries)
    }

    async fn global_summary(&self, date: Option<NaiveDate>) -> ClientResult<GlobalSummary> {
        let query: Vec<_> = date.map(|d| ("date_param", d.to_string())).into_iter().collect();
        self.get_json(&self.url("/summary"), &query).await
    }

    async fn timeseries(&self, iso3: &str, query: TimeseriesQuery) -> ClientResult<TimeSeries> {
        let code = iso3.trim().to_uppercase();
        let url = self.url(&format!(
            "/countries/{}/timeseries",
            urlencoding::encode(&code)
        ));

        let response: TimeseriesResponse = self.get_json(&url, &query.params()).await?;
        let series = TimeSeries::from(response);
        tracing::info!(iso3 = %code, records = series.len(), "Loaded timeseries");
        Ok(series)
    }
}
