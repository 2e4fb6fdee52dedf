//! Terminal rendering
//!
//! Summary cards, sparkline charts and tables for the dashboard. Every
//! function returns a `String` so callers decide where output goes.

use crate::api::{Country, GlobalSummary};
use super::state::CountryView;
use crate::metrics::{Metric, PeriodSummary, SmoothedRecord};
use std::fmt::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Placeholder for unreported values
pub const MISSING: &str = "N/A";

/// Format a count with thousands separators, e.g. `1,234,567`
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an optional count, using `N/A` when unreported
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_count).unwrap_or_else(|| MISSING.to_string())
}

/// Format a delta with an explicit sign, e.g. `+1,200` or `-50`
pub fn format_delta(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_count(value))
    } else {
        format_count(value)
    }
}

fn card(out: &mut String, label: &str, value: &str, note: Option<&str>) {
    let _ = match note {
        Some(note) => writeln!(out, "  {:<20} {:>18}  {}", label, value, note),
        None => writeln!(out, "  {:<20} {:>18}", label, value),
    };
}

/// Cards for the global summary
pub fn render_global_cards(summary: &GlobalSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Global Summary (as of {})", summary.date);
    let _ = writeln!(out, "{}", "-".repeat(44));
    card(&mut out, "Total Cases", &format_count(summary.total_confirmed_cases), None);
    card(&mut out, "Total Deaths", &format_count(summary.total_deaths), None);
    card(
        &mut out,
        "Countries Affected",
        &format_count(summary.countries_affected as f64),
        None,
    );
    card(&mut out, "Total Vaccinations", &format_count(summary.total_vaccinations), None);
    card(&mut out, "Fully Vaccinated", &format_count(summary.people_fully_vaccinated), None);
    out
}

/// Label, latest value and change note for each tracked metric card
pub fn summary_cards(summary: &PeriodSummary) -> Vec<(&'static str, f64, String)> {
    Metric::TRACKED
        .into_iter()
        .map(|metric| {
            let latest = summary.latest.get(metric).unwrap_or(0.0);
            let delta = summary.delta.get(metric).unwrap_or(0.0);
            (metric.label(), latest, format!("({} over period)", format_delta(delta)))
        })
        .collect()
}

/// Heading line for a region's summary cards
pub fn summary_title(summary: &PeriodSummary) -> String {
    format!("{} Summary (as of {})", summary.label, summary.date)
}

/// Cards for one region's period summary
pub fn render_summary_cards(summary: &PeriodSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary_title(summary));
    let _ = writeln!(out, "{}", "-".repeat(44));

    for (label, latest, note) in summary_cards(summary) {
        card(&mut out, label, &format_count(latest), Some(&note));
    }
    out
}

/// Region list as an aligned two-column table
pub fn render_countries(countries: &[Country]) -> String {
    if countries.is_empty() {
        return "No countries available.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {}", "ISO3", "Name");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for country in countries {
        let _ = writeln!(out, "{:<6} {}", country.iso3, country.name);
    }
    out
}

/// One-line sparkline of the last `width` values
///
/// Missing values render as a blank column. Returns an empty string when
/// nothing is reported.
pub fn sparkline(values: &[Option<f64>], width: usize) -> String {
    let values = &values[values.len().saturating_sub(width)..];
    let present = values.iter().flatten();
    let min = present.clone().copied().fold(f64::INFINITY, f64::min);
    let max = present.copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return String::new();
    }

    let span = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;
    values
        .iter()
        .map(|v| match v {
            None => ' ',
            Some(_) if span == 0.0 => SPARK_LEVELS[SPARK_LEVELS.len() / 2],
            Some(v) => SPARK_LEVELS[(((v - min) / span) * top).round() as usize],
        })
        .collect()
}

/// Labelled chart block: one sparkline per series plus the latest value
pub fn render_chart(title: &str, series: &[(&str, Vec<Option<f64>>)], width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    for (name, values) in series {
        let latest = values.iter().rev().flatten().next().copied();
        let _ = writeln!(
            out,
            "  {:<16} {:<width$} {}",
            name,
            sparkline(values, width),
            format_optional(latest),
            width = width
        );
    }
    out
}

/// Charts for a loaded region
///
/// Average lines appear only for metrics that were smoothed, and vaccinations
/// only when the region reports them.
pub fn render_charts(view: &CountryView, width: usize) -> String {
    let avg_label = format!("{}-Day Average", view.window);
    let lines = |metric, name| chart_lines(view, metric, name, &avg_label);

    let mut out = render_chart("Confirmed Cases", &lines(Metric::ConfirmedCases, "Cases"), width);
    out.push('\n');
    out.push_str(&render_chart("Cumulative Deaths", &lines(Metric::Deaths, "Deaths"), width));

    if view.series.has_vaccination_data() {
        let mut vaccinations = lines(Metric::TotalVaccinations, "Total");
        vaccinations.extend(lines(Metric::PeopleFullyVaccinated, "Fully Vaccinated"));
        out.push('\n');
        out.push_str(&render_chart("Total Vaccinations", &vaccinations, width));
    }
    out
}

fn chart_lines<'a>(
    view: &CountryView,
    metric: Metric,
    name: &'a str,
    avg_label: &'a str,
) -> Vec<(&'a str, Vec<Option<f64>>)> {
    let records = &view.smoothed;
    let mut lines = vec![(name, records.iter().map(|r| r.record.get(metric)).collect())];
    if records.first().is_some_and(|r| r.has_average(metric, view.window)) {
        lines.push((
            avg_label,
            records.iter().map(|r| r.average(metric, view.window)).collect(),
        ));
    }
    lines
}

/// Detailed table of the last `rows` records, newest first
pub fn render_table(view: &CountryView, rows: usize) -> String {
    let records = &view.smoothed;
    if records.is_empty() {
        return "No data for the selected range.\n".to_string();
    }

    let avg_header = format!("Cases ({}d avg)", view.window);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} | {:>14} | {:>16} | {:>12} | {:>14} | {:>16}",
        "Date", "Cases", avg_header, "Deaths", "Vaccinations", "Fully Vaccinated"
    );
    let _ = writeln!(out, "{}", "-".repeat(98));

    let start = records.len().saturating_sub(rows);
    for row in records[start..].iter().rev() {
        let r = &row.record;
        let _ = writeln!(
            out,
            "{:<12} | {:>14} | {:>16} | {:>12} | {:>14} | {:>16}",
            r.date.to_string(),
            format_optional(r.confirmed_cases),
            format_optional(row.average(Metric::ConfirmedCases, view.window)),
            format_optional(r.deaths),
            format_optional(r.total_vaccinations),
            format_optional(r.people_fully_vaccinated),
        );
    }
    out
}

/// CSV export of a smoothed series, oldest first
///
/// Columns are the record fields followed by every attached average.
pub fn render_csv(records: &[SmoothedRecord]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let average_names: Vec<String> = records
        .first()
        .map(|r| r.averages().map(|(k, _)| k.to_string()).collect())
        .unwrap_or_default();

    let mut header = vec!["date".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.field_name().to_string()));
    header.extend(average_names.iter().cloned());
    writer.write_record(&header)?;

    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for row in records {
        let mut fields = vec![row.record.date.to_string()];
        fields.extend(Metric::ALL.iter().map(|m| cell(row.record.get(*m))));
        let averages: Vec<(&str, Option<f64>)> = row.averages().collect();
        fields.extend(average_names.iter().map(|name| {
            cell(
                averages
                    .iter()
                    .find(|(k, _)| *k == name.as_str())
                    .and_then(|(_, v)| *v),
            )
        }));
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{rolling_average, summarize, DailyRecord, TimeSeries};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn records() -> Vec<DailyRecord> {
        vec![
            DailyRecord::new(day(1)).with(Metric::ConfirmedCases, 100.0).with(Metric::Deaths, 5.0),
            DailyRecord::new(day(2)).with(Metric::Deaths, 9.0),
            DailyRecord::new(day(3)).with(Metric::ConfirmedCases, 120.0),
        ]
    }

    fn view(records: Vec<DailyRecord>, window: usize) -> CountryView {
        CountryView::build(TimeSeries::new("TST", "Testland", records), "Testland", window).unwrap()
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1_000.0), "1,000");
        assert_eq!(format_count(1_234_567.4), "1,234,567");
        assert_eq!(format_count(-50_000.0), "-50,000");
        assert_eq!(format_optional(None), "N/A");
        assert_eq!(format_delta(1200.0), "+1,200");
        assert_eq!(format_delta(-3.0), "-3");
        assert_eq!(format_delta(0.0), "0");
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&[Some(0.0), Some(7.0)], 10), "▁█");
        assert_eq!(sparkline(&[Some(1.0), None, Some(1.0)], 10), "▅ ▅");
        assert_eq!(sparkline(&[None, None], 10), "");
        assert_eq!(sparkline(&[Some(0.0), Some(1.0), Some(2.0)], 2).chars().count(), 2);
    }

    #[test]
    fn test_table_newest_first_and_limited() {
        let table = render_table(&view(records(), 2), 2);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Cases (2d avg)"));
        assert!(lines[2].starts_with("2021-01-03"));
        assert!(lines[3].starts_with("2021-01-02"));
        assert!(lines[3].contains("N/A"));
    }

    #[test]
    fn test_summary_cards() {
        let summary = summarize(&records(), "Testland").unwrap();
        let cards = render_summary_cards(&summary);

        assert!(cards.starts_with("Testland Summary (as of 2021-01-03)"));
        assert!(cards.contains("(+20 over period)"));
        assert!(cards.contains("(-5 over period)"));
    }

    #[test]
    fn test_summary_card_values() {
        let summary = summarize(&records(), "Testland").unwrap();
        let cards = summary_cards(&summary);

        assert_eq!(cards.len(), Metric::TRACKED.len());
        assert_eq!(cards[0], ("Cases", 120.0, "(+20 over period)".to_string()));
        assert_eq!(cards[1].1, 0.0);
        assert_eq!(summary_title(&summary), "Testland Summary (as of 2021-01-03)");
    }

    #[test]
    fn test_charts_skip_vaccinations_when_unreported() {
        let charts = render_charts(&view(records(), 7), 30);

        assert!(charts.contains("Confirmed Cases"));
        assert_eq!(charts.matches("7-Day Average").count(), 2);
        assert!(!charts.contains("Total Vaccinations"));
    }

    #[test]
    fn test_charts_include_reported_vaccinations() {
        let mut records = records();
        records.push(
            DailyRecord::new(day(4))
                .with(Metric::TotalVaccinations, 5_000.0)
                .with(Metric::PeopleFullyVaccinated, 1_200.0),
        );
        let charts = render_charts(&view(records, 7), 30);

        assert!(charts.contains("Total Vaccinations"));
        assert!(charts.contains("Fully Vaccinated"));
        assert!(charts.contains("5,000"));
        // Vaccinations are not smoothed, so they carry no average line
        assert_eq!(charts.matches("7-Day Average").count(), 2);
    }

    #[test]
    fn test_csv_output() {
        let smoothed = rolling_average(&records(), Metric::ConfirmedCases, 2).unwrap();
        let csv = render_csv(&smoothed).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "date,confirmed_cases,deaths,total_vaccinations,people_vaccinated,\
             people_fully_vaccinated,daily_vaccinations,confirmed_cases_2dayAvg"
        );
        assert_eq!(lines[2], "2021-01-02,,9,,,,,100");
        assert_eq!(lines.len(), 4);
    }
}
