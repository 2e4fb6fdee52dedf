//! Covid Pulse Dashboard
//!
//! The presentation layer: loads data through a [`DataSource`], feeds the
//! metrics engine and renders the result for a terminal.
//!
//! ## Architecture
//!
//! - **state**: Reducer-driven view state (`Idle → Loading → Loaded | Errored`)
//! - **render**: Cards, sparkline charts, tables and CSV
//! - **counter**: Eased counter animation for summary cards
//!
//! ## Data Flow
//!
//! 1. The user selects a region
//! 2. The dashboard fetches its series from the data source
//! 3. The metrics engine derives averages and the period summary
//! 4. The reducer moves to `Loaded`, or `Errored` with a message

pub mod counter;
pub mod render;
pub mod state;

pub use counter::{ease_out_cubic, AnimationOutcome, CounterAnimation, FRAME_RATE};
pub use state::{CountryView, ViewAction, ViewState};

use crate::api::{Country, DataSource, GlobalSummary, TimeseriesQuery};
use crate::metrics::{PeriodSummary, SmoothedRecord, DEFAULT_WINDOW};
use chrono::NaiveDate;
use serde::Serialize;

/// Display settings for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Rolling-average window in days
    pub window: usize,
    /// Rows shown in the detailed table
    pub table_rows: usize,
    /// Sparkline width in columns
    pub chart_width: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            table_rows: 30,
            chart_width: 60,
        }
    }
}

/// Machine-readable view of a loaded region
///
/// `global` is only present when the caller fetched the global summary
/// alongside the region.
#[derive(Debug, Serialize)]
pub struct CountryReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<&'a GlobalSummary>,
    pub iso3: &'a str,
    pub country: &'a str,
    pub summary: Option<&'a PeriodSummary>,
    pub data: &'a [SmoothedRecord],
}

/// Dashboard session over a data source
pub struct Dashboard<S: DataSource> {
    source: S,
    settings: DashboardSettings,
    countries: Vec<Country>,
    state: ViewState,
}

impl<S: DataSource> Dashboard<S> {
    pub fn new(source: S, settings: DashboardSettings) -> Self {
        Self {
            source,
            settings,
            countries: Vec::new(),
            state: ViewState::Idle,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    fn dispatch(&mut self, action: ViewAction) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Fetch the region list
    ///
    /// Failures leave the previous list in place and return a message.
    pub async fn load_countries(&mut self) -> Result<&[Country], String> {
        match self.source.countries().await {
            Ok(countries) => {
                self.countries = countries;
                Ok(&self.countries)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load countries");
                Err(format!("Failed to load countries: {}", e))
            }
        }
    }

    /// Fetch the global summary
    pub async fn global_summary(&self, date: Option<NaiveDate>) -> Result<GlobalSummary, String> {
        self.source.global_summary(date).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load global summary");
            format!("Failed to load global summary: {}", e)
        })
    }

    /// Display label for a region: list name, then series name, then the code
    fn label_for(&self, iso3: &str, series_name: &str) -> String {
        self.countries
            .iter()
            .find(|c| c.iso3.eq_ignore_ascii_case(iso3))
            .map(|c| c.name.clone())
            .or_else(|| (!series_name.is_empty()).then(|| series_name.to_string()))
            .unwrap_or_else(|| iso3.to_string())
    }

    /// Select a region and load it, returning the resulting state
    pub async fn select(&mut self, iso3: &str, query: TimeseriesQuery) -> &ViewState {
        self.dispatch(ViewAction::Select(iso3.to_string()));
        let code = match self.state.selected() {
            Some(code) => code.to_string(),
            None => return &self.state,
        };

        let action = match self.source.timeseries(&code, query).await {
            Ok(series) => {
                let label = self.label_for(&code, series.name());
                match CountryView::build(series, &label, self.settings.window) {
                    Ok(view) => ViewAction::Fetched { iso3: code, view },
                    Err(e) => ViewAction::Failed {
                        iso3: code,
                        message: format!("Failed to derive metrics: {}", e),
                    },
                }
            }
            Err(e) => {
                tracing::error!(iso3 = %code, error = %e, "Failed to load timeseries");
                ViewAction::Failed {
                    iso3: code,
                    message: format!("Failed to load timeseries: {}", e),
                }
            }
        };

        self.dispatch(action);
        &self.state
    }

    /// Report for the loaded region, `None` unless the view is loaded
    pub fn report<'a>(&'a self, global: Option<&'a GlobalSummary>) -> Option<CountryReport<'a>> {
        let view = self.state.view()?;
        Some(CountryReport {
            global,
            iso3: view.series.iso3(),
            country: view.series.name(),
            summary: view.summary.as_ref(),
            data: &view.smoothed,
        })
    }

    /// Render the current country view
    pub fn render_country(&self) -> String {
        let mut out = match self.state.view().and_then(|view| view.summary.as_ref()) {
            Some(summary) => render::render_summary_cards(summary) + "\n",
            None => String::new(),
        };
        out.push_str(&self.render_country_details());
        out
    }

    /// Everything below the summary cards: status, charts and the table
    pub fn render_country_details(&self) -> String {
        match &self.state {
            ViewState::Idle => "No country selected.\n".to_string(),
            ViewState::Loading { iso3 } => format!("Loading data for {}...\n", iso3),
            ViewState::Errored { message, .. } => format!("Error: {}\n", message),
            ViewState::Loaded { view, .. } => {
                if view.smoothed.is_empty() {
                    return "No data for the selected range.\n".to_string();
                }
                let mut out = String::new();
                if let Some((first, last)) = view.series.date_span() {
                    out.push_str(&format!(
                        "Showing {} to {} ({} days)\n\n",
                        first,
                        last,
                        view.series.len()
                    ));
                }
                out.push_str(&render::render_charts(view, self.settings.chart_width));
                out.push('\n');
                out.push_str("Detailed Data\n");
                out.push_str(&render::render_table(view, self.settings.table_rows));
                out
            }
        }
    }
}
