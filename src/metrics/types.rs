//! Core data types for the metrics engine
//!
//! This module defines the fundamental types the engine works on:
//! - `DailyRecord`: One observation for one region on one date
//! - `Metric`: The numeric fields of a record
//! - `TimeSeries`: A date-ordered run of records for a single region

use super::error::{MetricsError, MetricsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One observation for one region on one calendar date
///
/// All counts are cumulative and optional. The API serves them as JSON
/// floats, and anything that is not a finite number decodes to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Cumulative confirmed cases
    #[serde(default, deserialize_with = "lenient_count")]
    pub confirmed_cases: Option<f64>,
    /// Cumulative deaths
    #[serde(default, deserialize_with = "lenient_count")]
    pub deaths: Option<f64>,
    /// Cumulative vaccine doses administered
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_vaccinations: Option<f64>,
    /// People with at least one dose
    #[serde(default, deserialize_with = "lenient_count")]
    pub people_vaccinated: Option<f64>,
    /// People with a full primary course
    #[serde(default, deserialize_with = "lenient_count")]
    pub people_fully_vaccinated: Option<f64>,
    /// Doses administered on this date
    #[serde(default, deserialize_with = "lenient_count")]
    pub daily_vaccinations: Option<f64>,
}

impl DailyRecord {
    /// Create an empty record for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            confirmed_cases: None,
            deaths: None,
            total_vaccinations: None,
            people_vaccinated: None,
            people_fully_vaccinated: None,
            daily_vaccinations: None,
        }
    }

    /// Builder method: set a metric value
    pub fn with(mut self, metric: Metric, value: impl Into<Option<f64>>) -> Self {
        *self.slot_mut(metric) = value.into();
        self
    }

    /// Get the value of a metric, if reported
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ConfirmedCases => self.confirmed_cases,
            Metric::Deaths => self.deaths,
            Metric::TotalVaccinations => self.total_vaccinations,
            Metric::PeopleVaccinated => self.people_vaccinated,
            Metric::PeopleFullyVaccinated => self.people_fully_vaccinated,
            Metric::DailyVaccinations => self.daily_vaccinations,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::ConfirmedCases => &mut self.confirmed_cases,
            Metric::Deaths => &mut self.deaths,
            Metric::TotalVaccinations => &mut self.total_vaccinations,
            Metric::PeopleVaccinated => &mut self.people_vaccinated,
            Metric::PeopleFullyVaccinated => &mut self.people_fully_vaccinated,
            Metric::DailyVaccinations => &mut self.daily_vaccinations,
        }
    }
}

/// Numeric field of a `DailyRecord`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ConfirmedCases,
    Deaths,
    TotalVaccinations,
    PeopleVaccinated,
    PeopleFullyVaccinated,
    DailyVaccinations,
}

impl Metric {
    /// Every metric, in wire order
    pub const ALL: [Metric; 6] = [
        Metric::ConfirmedCases,
        Metric::Deaths,
        Metric::TotalVaccinations,
        Metric::PeopleVaccinated,
        Metric::PeopleFullyVaccinated,
        Metric::DailyVaccinations,
    ];

    /// Cumulative metrics carried by a period summary
    pub const TRACKED: [Metric; 4] = [
        Metric::ConfirmedCases,
        Metric::Deaths,
        Metric::TotalVaccinations,
        Metric::PeopleFullyVaccinated,
    ];

    /// Field name used on the wire
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::ConfirmedCases => "confirmed_cases",
            Metric::Deaths => "deaths",
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::PeopleVaccinated => "people_vaccinated",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
            Metric::DailyVaccinations => "daily_vaccinations",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ConfirmedCases => "Cases",
            Metric::Deaths => "Deaths",
            Metric::TotalVaccinations => "Vaccinations",
            Metric::PeopleVaccinated => "Vaccinated",
            Metric::PeopleFullyVaccinated => "Fully Vaccinated",
            Metric::DailyVaccinations => "Daily Vaccinations",
        }
    }

    /// Name of the trailing-average field for a window, e.g. `deaths_7dayAvg`
    pub fn average_field(&self, window: usize) -> String {
        format!("{}_{}dayAvg", self.field_name(), window)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for Metric {
    type Err = MetricsError;

    fn from_str(s: &str) -> MetricsResult<Self> {
        let name = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.field_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))
    }
}

/// Ordered records for exactly one region
///
/// Construction sorts by date and keeps one record per date, so every
/// consumer can rely on ascending, duplicate-free order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    iso3: String,
    name: String,
    records: Vec<DailyRecord>,
}

impl TimeSeries {
    /// Build a series, sorting by date and dropping duplicate dates
    ///
    /// When a date appears more than once the last occurrence wins.
    pub fn new(iso3: impl Into<String>, name: impl Into<String>, mut records: Vec<DailyRecord>) -> Self {
        let iso3 = iso3.into();
        records.sort_by_key(|r| r.date);

        let mut deduped: Vec<DailyRecord> = Vec::with_capacity(records.len());
        for record in records {
            match deduped.last_mut() {
                Some(prev) if prev.date == record.date => {
                    tracing::warn!(iso3 = %iso3, date = %record.date, "Duplicate date in series, keeping latest");
                    *prev = record;
                }
                _ => deduped.push(record),
            }
        }

        Self {
            iso3,
            name: name.into(),
            records: deduped,
        }
    }

    pub fn iso3(&self) -> &str {
        &self.iso3
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date covered, if any
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.records.first()?.date, self.records.last()?.date))
    }

    /// Whether any record reports a non-zero vaccination total
    pub fn has_vaccination_data(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.total_vaccinations.is_some_and(|v| v != 0.0))
    }
}

/// Decode an optional count, mapping anything non-numeric to `None`
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// Decode a total, mapping anything non-numeric to zero
pub(crate) fn lenient_total<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_count(deserializer)?.unwrap_or(0.0))
}

/// Interpret a JSON value as a count
///
/// Numbers and numeric strings are accepted; non-finite results are not.
pub fn count_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}
