//! Data Transfer Objects
//!
//! Response types served by the COVID-19 data API.
//! These types are deserialized from JSON.

use crate::metrics::types::lenient_total;
use crate::metrics::{DailyRecord, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================
// COUNTRY DTOs
// ============================================

/// Region listed by `GET /countries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO 3166-1 alpha-3 code
    pub iso3: String,
    /// Display name
    pub name: String,
}

/// Body of `GET /countries/{iso3}/timeseries`
#[derive(Debug, Deserialize)]
pub struct TimeseriesResponse {
    pub iso3: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub data: Vec<DailyRecord>,
}

impl From<TimeseriesResponse> for TimeSeries {
    fn from(response: TimeseriesResponse) -> Self {
        let name = response.country.unwrap_or_else(|| response.iso3.clone());
        TimeSeries::new(response.iso3, name, response.data)
    }
}

/// Optional date bounds for a timeseries request (inclusive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeseriesQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl TimeseriesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    /// Query string pairs for the request
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from_date {
            params.push(("from_date", from.to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("to_date", to.to_string()));
        }
        params
    }
}

// ============================================
// SUMMARY DTOs
// ============================================

/// Body of `GET /summary`: totals across every region on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_total")]
    pub total_confirmed_cases: f64,
    #[serde(default, deserialize_with = "lenient_total")]
    pub total_deaths: f64,
    #[serde(default, deserialize_with = "lenient_total")]
    pub total_vaccinations: f64,
    #[serde(default, deserialize_with = "lenient_total")]
    pub people_fully_vaccinated: f64,
    /// Regions with at least one confirmed case
    #[serde(default)]
    pub countries_affected: u64,
}

// ============================================
// METADATA DTOs
// ============================================

/// Body of `GET /metrics`
#[derive(Debug, Clone, Deserialize)]
pub struct MetricCatalog {
    #[serde(default)]
    pub metrics: Vec<String>,
}

/// Body of `GET /dates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub total_days: u64,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Error body the API attaches to non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timeseries_response_into_series() {
        let response: TimeseriesResponse = serde_json::from_value(json!({
            "iso3": "USA",
            "country": "United States",
            "data": [
                {"date": "2021-01-02", "confirmed_cases": 20.0, "deaths": null},
                {"date": "2021-01-01", "confirmed_cases": 10.0}
            ]
        }))
        .unwrap();

        let series: TimeSeries = response.into();
        assert_eq!(series.iso3(), "USA");
        assert_eq!(series.name(), "United States");
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].confirmed_cases, Some(10.0));
    }

    #[test]
    fn test_global_summary_null_totals() {
        let summary: GlobalSummary = serde_json::from_value(json!({
            "date": "2021-06-30",
            "total_confirmed_cases": 1.5e8,
            "total_deaths": 3.2e6,
            "total_vaccinations": null,
            "countries_affected": 190
        }))
        .unwrap();

        assert_eq!(summary.total_confirmed_cases, 1.5e8);
        assert_eq!(summary.total_vaccinations, 0.0);
        assert_eq!(summary.people_fully_vaccinated, 0.0);
        assert_eq!(summary.countries_affected, 190);
    }

    #[test]
    fn test_query_params() {
        let from = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert!(TimeseriesQuery::new().params().is_empty());
        assert_eq!(
            TimeseriesQuery::new().from_date(from).params(),
            vec![("from_date", "2021-01-01".to_string())]
        );
    }
}
