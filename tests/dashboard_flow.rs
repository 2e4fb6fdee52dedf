//! Dashboard tests over an in-memory data source

use async_trait::async_trait;
use chrono::NaiveDate;
use covid_pulse::api::{ClientError, ClientResult, Country, DataSource, GlobalSummary, TimeseriesQuery};
use covid_pulse::dashboard::{Dashboard, DashboardSettings, ViewState};
use covid_pulse::metrics::{DailyRecord, Metric, TimeSeries};
use std::collections::HashMap;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 2, d).unwrap()
}

#[derive(Default)]
struct MemorySource {
    countries: Option<Vec<Country>>,
    global: Option<GlobalSummary>,
    series: HashMap<String, Vec<DailyRecord>>,
}

impl MemorySource {
    fn with_usa() -> Self {
        let records = (1..=10)
            .map(|d| {
                DailyRecord::new(day(d))
                    .with(Metric::ConfirmedCases, 1_000.0 + d as f64 * 100.0)
                    .with(Metric::Deaths, if d == 1 { None } else { Some(d as f64) })
            })
            .collect();

        Self {
            countries: Some(vec![Country {
                iso3: "USA".to_string(),
                name: "United States of America".to_string(),
            }]),
            global: None,
            series: HashMap::from([("USA".to_string(), records)]),
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn countries(&self) -> ClientResult<Vec<Country>> {
        self.countries.clone().ok_or(ClientError::Unavailable)
    }

    async fn global_summary(&self, _date: Option<NaiveDate>) -> ClientResult<GlobalSummary> {
        self.global.clone().ok_or(ClientError::Timeout)
    }

    async fn timeseries(&self, iso3: &str, query: TimeseriesQuery) -> ClientResult<TimeSeries> {
        let records = self
            .series
            .get(iso3)
            .ok_or_else(|| ClientError::NotFound(format!("Country {} not found", iso3)))?
            .iter()
            .filter(|r| query.from_date.map_or(true, |from| r.date >= from))
            .filter(|r| query.to_date.map_or(true, |to| r.date <= to))
            .cloned()
            .collect();
        Ok(TimeSeries::new(iso3, "", records))
    }
}

#[tokio::test]
async fn test_select_loads_and_derives() {
    let mut dashboard = Dashboard::new(MemorySource::with_usa(), DashboardSettings::default());
    dashboard.load_countries().await.unwrap();

    let state = dashboard.select("usa", TimeseriesQuery::new()).await;
    let view = state.view().expect("loaded");

    assert_eq!(view.smoothed.len(), 10);
    assert_eq!(view.window, 7);

    let summary = view.summary.as_ref().unwrap();
    assert_eq!(summary.label, "United States of America");
    assert_eq!(summary.date, day(10));
    assert_eq!(summary.new_cases(), 900.0);
    // Missing first value counts as zero in the delta
    assert_eq!(summary.new_deaths(), 10.0);

    // Rolling average skips the missing first value instead
    assert_eq!(view.smoothed[1].average(Metric::Deaths, 7), Some(2.0));

    let rendered = dashboard.render_country();
    assert!(rendered.contains("United States of America Summary"));
    assert!(rendered.contains("Showing 2021-02-01 to 2021-02-10 (10 days)"));
    assert!(rendered.contains("Detailed Data"));
    assert!(rendered.contains("2021-02-10"));
}

#[tokio::test]
async fn test_label_falls_back_to_code() {
    let mut source = MemorySource::with_usa();
    source.countries = None;
    let mut dashboard = Dashboard::new(source, DashboardSettings::default());

    let message = dashboard.load_countries().await.unwrap_err();
    assert_eq!(message, "Failed to load countries: API unavailable");

    let state = dashboard.select("USA", TimeseriesQuery::new()).await;
    assert_eq!(state.view().unwrap().summary.as_ref().unwrap().label, "USA");
}

#[tokio::test]
async fn test_failed_load_is_errored_state() {
    let mut dashboard = Dashboard::new(MemorySource::with_usa(), DashboardSettings::default());

    let state = dashboard.select("XXX", TimeseriesQuery::new()).await;
    assert_eq!(
        state.error(),
        Some("Failed to load timeseries: Not found: Country XXX not found")
    );
    assert!(dashboard.render_country().starts_with("Error: "));
}

#[tokio::test]
async fn test_invalid_window_is_errored_state() {
    let settings = DashboardSettings {
        window: 0,
        ..DashboardSettings::default()
    };
    let mut dashboard = Dashboard::new(MemorySource::with_usa(), settings);

    let state = dashboard.select("USA", TimeseriesQuery::new()).await;
    assert!(matches!(state, ViewState::Errored { .. }));
}

#[tokio::test]
async fn test_empty_range_has_no_summary() {
    let mut dashboard = Dashboard::new(MemorySource::with_usa(), DashboardSettings::default());

    let query = TimeseriesQuery::new().from_date(day(20));
    let state = dashboard.select("USA", query).await;
    let view = state.view().unwrap();

    assert!(view.smoothed.is_empty());
    assert!(view.summary.is_none());
    assert!(dashboard.render_country().contains("No data for the selected range."));
}

#[tokio::test]
async fn test_global_summary_error_message() {
    let dashboard = Dashboard::new(MemorySource::with_usa(), DashboardSettings::default());
    let message = dashboard.global_summary(None).await.unwrap_err();
    assert_eq!(message, "Failed to load global summary: Request timeout");
}

#[tokio::test]
async fn test_report_carries_global_summary() {
    let mut source = MemorySource::with_usa();
    source.global = Some(GlobalSummary {
        date: day(10),
        total_confirmed_cases: 106_000_000.0,
        total_deaths: 2_300_000.0,
        total_vaccinations: 0.0,
        people_fully_vaccinated: 0.0,
        countries_affected: 190,
    });
    let mut dashboard = Dashboard::new(source, DashboardSettings::default());
    assert!(dashboard.report(None).is_none());

    let global = dashboard.global_summary(None).await.unwrap();
    dashboard.select("USA", TimeseriesQuery::new()).await;

    let body = serde_json::to_value(dashboard.report(Some(&global)).unwrap()).unwrap();
    assert_eq!(body["global"]["countries_affected"], 190);
    assert_eq!(body["global"]["date"], "2021-02-10");
    assert_eq!(body["iso3"], "USA");
    assert_eq!(body["summary"]["latest"]["confirmed_cases"], 2_000.0);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"][9]["confirmed_cases_7dayAvg"], 1_700.0);

    let without = serde_json::to_value(dashboard.report(None).unwrap()).unwrap();
    assert!(without.get("global").is_none());
}
