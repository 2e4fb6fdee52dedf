//! Trailing-window averages
//!
//! Each output position averages the current value and up to `window - 1`
//! preceding values. Missing values are skipped entirely: they add nothing to
//! the sum and nothing to the count. A window with no reported values yields
//! `None`. The start of a series uses whatever prefix is available.

use super::error::{MetricsError, MetricsResult};
use super::types::{DailyRecord, Metric, TimeSeries};
use serde::Serialize;
use std::collections::BTreeMap;

/// Window used when callers do not pick one
pub const DEFAULT_WINDOW: usize = 7;

/// A record plus one or more trailing-average fields
///
/// Serialises flat, so the averages sit next to the original fields under
/// keys such as `confirmed_cases_7dayAvg`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedRecord {
    #[serde(flatten)]
    pub record: DailyRecord,
    #[serde(flatten)]
    averages: BTreeMap<String, Option<f64>>,
}

impl SmoothedRecord {
    /// Wrap a record with no averages attached yet
    pub fn from_record(record: DailyRecord) -> Self {
        Self {
            record,
            averages: BTreeMap::new(),
        }
    }

    /// Builder: attach the average of `metric` over `window`
    pub fn with_average(mut self, metric: Metric, window: usize, value: Option<f64>) -> Self {
        self.averages.insert(metric.average_field(window), value);
        self
    }

    /// The attached average, `None` when absent or when the window was all missing
    pub fn average(&self, metric: Metric, window: usize) -> Option<f64> {
        self.averages
            .get(&metric.average_field(window))
            .copied()
            .flatten()
    }

    /// Whether an average for `metric` over `window` has been attached
    pub fn has_average(&self, metric: Metric, window: usize) -> bool {
        self.averages.contains_key(&metric.average_field(window))
    }

    /// All attached averages keyed by field name
    pub fn averages(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.averages.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Trailing means over a plain value column
pub fn trailing_means(values: &[Option<f64>], window: usize) -> MetricsResult<Vec<Option<f64>>> {
    if window == 0 {
        return Err(MetricsError::InvalidWindow(window));
    }

    Ok((0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean_of_present(&values[start..=i])
        })
        .collect())
}

fn mean_of_present(window: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = window
        .iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return None;
    }
    if sum.is_finite() {
        return Some(sum / count as f64);
    }
    // Sum overflowed; scale each value first so the mean stays finite
    let n = count as f64;
    Some(window.iter().flatten().map(|v| v / n).sum())
}

/// Smooth one metric of a record sequence
///
/// Returns a new sequence of the same length and order. The input is left
/// untouched.
pub fn rolling_average(
    records: &[DailyRecord],
    metric: Metric,
    window: usize,
) -> MetricsResult<Vec<SmoothedRecord>> {
    smooth_all(records, &[(metric, window)])
}

/// Smooth several metrics at once, attaching one field per `(metric, window)`
pub fn smooth_all(
    records: &[DailyRecord],
    specs: &[(Metric, usize)],
) -> MetricsResult<Vec<SmoothedRecord>> {
    let columns = specs
        .iter()
        .map(|&(metric, window)| -> MetricsResult<_> {
            let column: Vec<Option<f64>> = records.iter().map(|r| r.get(metric)).collect();
            Ok((metric, window, trailing_means(&column, window)?))
        })
        .collect::<MetricsResult<Vec<_>>>()?;

    Ok(records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            columns.iter().fold(
                SmoothedRecord::from_record(record.clone()),
                |out, (metric, window, means)| out.with_average(*metric, *window, means[i]),
            )
        })
        .collect())
}

impl TimeSeries {
    /// Smooth one metric of this series
    pub fn rolling_average(&self, metric: Metric, window: usize) -> MetricsResult<Vec<SmoothedRecord>> {
        rolling_average(self.records(), metric, window)
    }
}
