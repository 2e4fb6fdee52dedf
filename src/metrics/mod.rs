//! Covid Pulse Metrics Engine
//!
//! Pure functions that turn a raw daily series into chart and table ready data:
//!
//! - **types**: Core data structures (DailyRecord, Metric, TimeSeries)
//! - **rolling**: Trailing-window averages with missing-value exclusion
//! - **summary**: Latest values and first-to-last deltas
//! - **error**: Error types
//!
//! # Missing values
//!
//! The two operations treat missing values differently. Rolling averages skip
//! them; summaries count them as zero. Both behaviours are deliberate and
//! covered by tests.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use covid_pulse::metrics::{rolling_average, summarize, DailyRecord, Metric};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2021, 1, d).unwrap();
//! let records = vec![
//!     DailyRecord::new(day(1)).with(Metric::ConfirmedCases, 100.0),
//!     DailyRecord::new(day(2)).with(Metric::ConfirmedCases, None),
//!     DailyRecord::new(day(3)).with(Metric::ConfirmedCases, 120.0),
//! ];
//!
//! let smoothed = rolling_average(&records, Metric::ConfirmedCases, 2).unwrap();
//! assert_eq!(smoothed[1].average(Metric::ConfirmedCases, 2), Some(100.0));
//!
//! let summary = summarize(&records, "Testland").unwrap();
//! assert_eq!(summary.new_cases(), 20.0);
//! ```

pub mod error;
pub mod rolling;
pub mod summary;
pub mod types;

pub use error::{MetricsError, MetricsResult};
pub use rolling::{rolling_average, smooth_all, trailing_means, SmoothedRecord, DEFAULT_WINDOW};
pub use summary::{summarize, MetricTotals, PeriodSummary};
pub use types::{count_from_value, DailyRecord, Metric, TimeSeries};
