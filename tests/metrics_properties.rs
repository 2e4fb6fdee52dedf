//! Properties of the metrics engine over decoded API payloads

use covid_pulse::metrics::{
    rolling_average, summarize, trailing_means, DailyRecord, Metric, TimeSeries,
};
use serde_json::json;

/// Deterministic mix of reported and missing values
fn series(len: usize, seed: u64) -> Vec<DailyRecord> {
    let start = chrono::NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    let mut state = seed;
    (0..len)
        .map(|i| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let value = if state % 4 == 0 { None } else { Some((state >> 40) as f64) };
            DailyRecord::new(start + chrono::Duration::days(i as i64))
                .with(Metric::ConfirmedCases, value)
        })
        .collect()
}

#[test]
fn test_gap_scenario_from_json() {
    let records: Vec<DailyRecord> = serde_json::from_value(json!([
        {"date": "2021-01-01", "confirmed_cases": 100},
        {"date": "2021-01-02", "confirmed_cases": null},
        {"date": "2021-01-03", "confirmed_cases": 120}
    ]))
    .unwrap();

    let out = rolling_average(&records, Metric::ConfirmedCases, 2).unwrap();
    let json = serde_json::to_value(&out).unwrap();

    assert_eq!(json[0]["confirmed_cases_2dayAvg"], 100.0);
    assert_eq!(json[1]["confirmed_cases_2dayAvg"], 100.0);
    assert_eq!(json[2]["confirmed_cases_2dayAvg"], 120.0);
    assert!(json[1]["confirmed_cases"].is_null());
}

#[test]
fn test_length_and_originals_preserved() {
    for (len, window) in [(0, 7), (1, 7), (5, 3), (40, 7), (40, 14)] {
        let records = series(len, len as u64 + 11);
        let out = rolling_average(&records, Metric::ConfirmedCases, window).unwrap();

        assert_eq!(out.len(), records.len());
        assert!(out.iter().zip(&records).all(|(o, r)| &o.record == r));
    }
}

#[test]
fn test_window_one_passthrough() {
    let records = series(50, 3);
    let out = rolling_average(&records, Metric::ConfirmedCases, 1).unwrap();

    for (o, r) in out.iter().zip(&records) {
        assert_eq!(o.average(Metric::ConfirmedCases, 1), r.confirmed_cases);
    }
}

#[test]
fn test_prefix_window_matches_manual_mean() {
    let records = series(30, 99);
    let window = 7;
    let out = rolling_average(&records, Metric::ConfirmedCases, window).unwrap();

    for i in 0..records.len() {
        let start = (i + 1).saturating_sub(window);
        let present: Vec<f64> = records[start..=i]
            .iter()
            .filter_map(|r| r.confirmed_cases)
            .collect();
        let expected = if present.is_empty() {
            None
        } else {
            Some(present.iter().sum::<f64>() / present.len() as f64)
        };
        assert_eq!(out[i].average(Metric::ConfirmedCases, window), expected, "index {i}");
    }
}

#[test]
fn test_idempotent() {
    let records = series(60, 42);
    let first = rolling_average(&records, Metric::ConfirmedCases, 7).unwrap();
    let second = rolling_average(&records, Metric::ConfirmedCases, 7).unwrap();
    assert_eq!(first, second);

    let column: Vec<Option<f64>> = records.iter().map(|r| r.confirmed_cases).collect();
    assert_eq!(trailing_means(&column, 7).unwrap(), trailing_means(&column, 7).unwrap());
}

#[test]
fn test_summary_scenarios_from_json() {
    let records: Vec<DailyRecord> = serde_json::from_value(json!([
        {"date": "2021-01-01", "deaths": 5},
        {"date": "2021-01-02", "deaths": 9}
    ]))
    .unwrap();
    let summary = summarize(&records, "d").unwrap();
    assert_eq!(summary.delta.deaths, 4.0);
    assert_eq!(summary.latest.deaths, 9.0);

    let records: Vec<DailyRecord> = serde_json::from_value(json!([
        {"date": "2021-01-01", "deaths": null},
        {"date": "2021-01-02", "deaths": 3}
    ]))
    .unwrap();
    let summary = summarize(&records, "d").unwrap();
    assert_eq!(summary.delta.deaths, 3.0);
}

#[test]
fn test_summary_of_empty_series() {
    let series = TimeSeries::new("ATA", "Antarctica", Vec::new());
    assert!(series.summarize("Antarctica").is_none());
    assert!(series.rolling_average(Metric::Deaths, 7).unwrap().is_empty());
}
