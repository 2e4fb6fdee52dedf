//! Dashboard View State
//!
//! The view is driven by a reducer over explicit transitions:
//!
//! ```text
//! Idle --Select--> Loading --Fetched--> Loaded
//!                     |
//!                     +----Failed----> Errored
//! ```
//!
//! Selecting a region from any state re-enters `Loading`. Responses for a
//! region that is no longer selected are dropped.

use crate::metrics::{
    smooth_all, Metric, MetricsResult, PeriodSummary, SmoothedRecord, TimeSeries,
};

/// Everything rendered for one loaded region
#[derive(Debug, Clone, PartialEq)]
pub struct CountryView {
    pub series: TimeSeries,
    pub smoothed: Vec<SmoothedRecord>,
    pub summary: Option<PeriodSummary>,
    pub window: usize,
}

impl CountryView {
    /// Derive the view from a freshly fetched series
    ///
    /// Cases and deaths get a trailing average over `window`.
    pub fn build(series: TimeSeries, label: &str, window: usize) -> MetricsResult<Self> {
        let smoothed = smooth_all(
            series.records(),
            &[(Metric::ConfirmedCases, window), (Metric::Deaths, window)],
        )?;
        let summary = series.summarize(label);

        Ok(Self {
            series,
            smoothed,
            summary,
            window,
        })
    }
}

/// Current state of the country view
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// Waiting for a region's series
    Loading { iso3: String },
    /// Series loaded and derived
    Loaded { iso3: String, view: Box<CountryView> },
    /// Load failed with a user-visible message
    Errored { iso3: String, message: String },
}

/// Events that move the view between states
#[derive(Debug, Clone)]
pub enum ViewAction {
    /// User picked a region
    Select(String),
    /// Series for a region arrived and was derived
    Fetched { iso3: String, view: CountryView },
    /// Loading a region failed
    Failed { iso3: String, message: String },
}

impl ViewState {
    /// Apply an action, returning the next state
    pub fn reduce(self, action: ViewAction) -> ViewState {
        match action {
            ViewAction::Select(iso3) => ViewState::Loading {
                iso3: iso3.trim().to_uppercase(),
            },
            ViewAction::Fetched { iso3, view } => {
                if self.is_loading(&iso3) {
                    ViewState::Loaded {
                        iso3,
                        view: Box::new(view),
                    }
                } else {
                    tracing::debug!(iso3 = %iso3, "Dropping stale response");
                    self
                }
            }
            ViewAction::Failed { iso3, message } => {
                if self.is_loading(&iso3) {
                    ViewState::Errored { iso3, message }
                } else {
                    tracing::debug!(iso3 = %iso3, "Dropping stale failure");
                    self
                }
            }
        }
    }

    fn is_loading(&self, code: &str) -> bool {
        matches!(self, ViewState::Loading { iso3 } if iso3 == code)
    }

    /// Region currently selected, if any
    pub fn selected(&self) -> Option<&str> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading { iso3 }
            | ViewState::Loaded { iso3, .. }
            | ViewState::Errored { iso3, .. } => Some(iso3.as_str()),
        }
    }

    pub fn loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Errored { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<&CountryView> {
        match self {
            ViewState::Loaded { view, .. } => Some(view.as_ref()),
            _ => None,
        }
    }
}
