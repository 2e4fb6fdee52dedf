//! Period summaries
//!
//! A summary compares the last record of a series with the first one. Unlike
//! the rolling averages, missing values count as zero here: a series that
//! starts unreported and later reports `3` has a delta of `3`. Negative
//! deltas (upstream revisions) are reported as-is.

use super::types::{DailyRecord, Metric, TimeSeries};
use chrono::NaiveDate;
use serde::Serialize;

/// One value per tracked cumulative metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricTotals {
    pub confirmed_cases: f64,
    pub deaths: f64,
    pub total_vaccinations: f64,
    pub people_fully_vaccinated: f64,
}

impl MetricTotals {
    fn from_fn(mut f: impl FnMut(Metric) -> f64) -> Self {
        Self {
            confirmed_cases: f(Metric::ConfirmedCases),
            deaths: f(Metric::Deaths),
            total_vaccinations: f(Metric::TotalVaccinations),
            people_fully_vaccinated: f(Metric::PeopleFullyVaccinated),
        }
    }

    /// Value for a tracked metric; `None` for metrics a summary does not carry
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::ConfirmedCases => Some(self.confirmed_cases),
            Metric::Deaths => Some(self.deaths),
            Metric::TotalVaccinations => Some(self.total_vaccinations),
            Metric::PeopleFullyVaccinated => Some(self.people_fully_vaccinated),
            Metric::PeopleVaccinated | Metric::DailyVaccinations => None,
        }
    }
}

/// Point-in-time view of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Region display label
    pub label: String,
    /// Date of the last record
    pub date: NaiveDate,
    /// Value of each metric on the last record
    pub latest: MetricTotals,
    /// Last minus first, per metric
    pub delta: MetricTotals,
}

impl PeriodSummary {
    /// Cases added over the displayed window
    pub fn new_cases(&self) -> f64 {
        self.delta.confirmed_cases
    }

    /// Deaths added over the displayed window
    pub fn new_deaths(&self) -> f64 {
        self.delta.deaths
    }
}

/// Summarise a record sequence, or `None` if there is nothing to summarise
pub fn summarize(records: &[DailyRecord], label: impl Into<String>) -> Option<PeriodSummary> {
    let first = records.first()?;
    let last = records.last()?;
    let value = |record: &DailyRecord, metric| record.get(metric).unwrap_or(0.0);

    Some(PeriodSummary {
        label: label.into(),
        date: last.date,
        latest: MetricTotals::from_fn(|m| value(last, m)),
        delta: MetricTotals::from_fn(|m| value(last, m) - value(first, m)),
    })
}

impl TimeSeries {
    /// Summarise this series under the given label
    pub fn summarize(&self, label: impl Into<String>) -> Option<PeriodSummary> {
        summarize(self.records(), label)
    }
}
