use super::ui;
use crate::core::{
    CurrencySummary, RateMetric, RatesProvider, Window, WindowReport, summarize_window,
};
use anyhow::{Context, Result};
use clap::ValueEnum;
use comfy_table::{Cell, Color};
use std::sync::Arc;

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// How the per-currency summaries are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per currency
    #[default]
    Plain,
    /// Styled table
    Table,
    /// JSON array
    Json,
}

/// `<name>(<code>)\t, maximum value: .. on ..; minimum value: .. on ..; average value: ..`
pub fn format_summary_line(summary: &CurrencySummary) -> String {
    format!(
        "{}({})\t, maximum value: {:.4} on {}; minimum value: {:.4} on {}; average value: {:.4}",
        summary.name,
        summary.code,
        summary.max.value,
        summary.max.day.format(DISPLAY_DATE_FORMAT),
        summary.min.value,
        summary.min.day.format(DISPLAY_DATE_FORMAT),
        summary.average,
    )
}

pub fn render_plain(report: &WindowReport) -> String {
    report
        .summaries
        .values()
        .map(format_summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(report: &WindowReport, window: &Window, metric: RateMetric) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Code"),
        ui::header_cell("Maximum"),
        ui::header_cell("On"),
        ui::header_cell("Minimum"),
        ui::header_cell("On"),
        ui::header_cell("Average"),
        ui::header_cell("Days"),
    ]);

    for summary in report.summaries.values() {
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(&summary.code),
            ui::rate_cell(summary.max.value, Some(Color::Green)),
            Cell::new(summary.max.day.format(DISPLAY_DATE_FORMAT)),
            ui::rate_cell(summary.min.value, Some(Color::Red)),
            Cell::new(summary.min.day.format(DISPLAY_DATE_FORMAT)),
            ui::rate_cell(summary.average, None),
            Cell::new(summary.samples),
        ]);
    }

    let last_day = window.days().last().unwrap_or(window.start());
    let mut output = format!(
        "Exchange rates ({metric}): {}\n\n",
        ui::style_text(
            &format!(
                "{} - {}",
                window.start().format(DISPLAY_DATE_FORMAT),
                last_day.format(DISPLAY_DATE_FORMAT)
            ),
            ui::StyleType::Title
        )
    );
    output.push_str(&table.to_string());

    if !report.failures.is_empty() {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!(
                    "{} of {} days could not be retrieved",
                    report.failures.len(),
                    report.days_requested
                ),
                ui::StyleType::Error
            )
        ));
        for failure in &report.failures {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("  {}: {}", failure.day.format(DISPLAY_DATE_FORMAT), failure.reason),
                    ui::StyleType::Subtle
                )
            ));
        }
    }

    output
}

pub fn render_json(report: &WindowReport) -> Result<String> {
    let summaries: Vec<_> = report.summaries.values().collect();
    serde_json::to_string_pretty(&summaries).context("Failed to serialize summaries")
}

pub async fn run(
    provider: Arc<dyn RatesProvider>,
    window: &Window,
    metric: RateMetric,
    format: OutputFormat,
) -> Result<()> {
    let pb = ui::new_progress_bar(window.len() as u64);
    pb.set_message("Fetching daily rates...");

    let pb_clone = pb.clone();
    let report = summarize_window(provider, window, metric, move || pb_clone.inc(1)).await;
    pb.finish_and_clear();

    let output = match format {
        OutputFormat::Plain => render_plain(&report),
        OutputFormat::Table => render_table(&report, window, metric),
        OutputFormat::Json => render_json(&report)?,
    };
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DayFailure, Extreme};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    fn summary(code: &str, name: &str) -> CurrencySummary {
        CurrencySummary {
            name: name.to_string(),
            code: code.to_string(),
            min: Extreme {
                value: 1.1,
                day: day(1),
            },
            max: Extreme {
                value: 1.12,
                day: day(3),
            },
            average: 1.11,
            samples: 2,
        }
    }

    fn report() -> WindowReport {
        WindowReport {
            summaries: BTreeMap::from([
                ("USD".to_string(), summary("USD", "US Dollar")),
                ("EUR".to_string(), summary("EUR", "Euro")),
            ]),
            days_requested: 3,
            failures: vec![DayFailure {
                day: day(2),
                reason: "HTTP error: 503 Service Unavailable for 2024-03-02".to_string(),
            }],
        }
    }

    #[test]
    fn test_summary_line_format() {
        assert_eq!(
            format_summary_line(&summary("EUR", "Euro")),
            "Euro(EUR)\t, maximum value: 1.1200 on 03/03/2024; minimum value: 1.1000 on 01/03/2024; average value: 1.1100"
        );
    }

    #[test]
    fn test_plain_output_sorted_by_code() {
        let output = render_plain(&report());
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Euro(EUR)"));
        assert!(lines[1].starts_with("US Dollar(USD)"));
    }

    #[test]
    fn test_table_lists_failed_days() {
        let window = Window::new(day(1), day(4)).unwrap();
        let output = render_table(&report(), &window, RateMetric::Value);
        assert!(output.contains("US Dollar"));
        assert!(output.contains("1.1200"));
        assert!(output.contains("1 of 3 days could not be retrieved"));
        assert!(output.contains("02/03/2024"));
    }

    #[test]
    fn test_json_output() {
        let output = render_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["code"], "EUR");
        assert_eq!(value[0]["max"]["value"], 1.12);
        assert_eq!(value[0]["max"]["day"], "2024-03-03");
        assert_eq!(value[1]["code"], "USD");
    }
}
