use comfy_table::Cell;
use serde::Serialize;

use crate::series::{DayRecord, RateReport};
use crate::ui;

/// Aggregate statistics over one day series. Every field is optional: a
/// series with no reported rates produces a summary of absences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSummary {
    pub start_rate: Option<f64>,
    pub end_rate: Option<f64>,
    pub total_pct_change: Option<f64>,
    pub mean_rate: Option<f64>,
}

/// Derives the summary from a day series. No rounding is applied here;
/// display formatting happens in the ui layer.
pub fn summarize(days: &[DayRecord]) -> RateSummary {
    let start_rate = days.first().and_then(|d| d.rate);
    let end_rate = days.last().and_then(|d| d.rate);

    let total_pct_change = match (start_rate, end_rate) {
        (Some(start), Some(end)) if start != 0.0 => Some((end - start) / start * 100.0),
        _ => None,
    };

    let rates: Vec<f64> = days.iter().filter_map(|d| d.rate).collect();
    let mean_rate = if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    };

    RateSummary {
        start_rate,
        end_rate,
        total_pct_change,
        mean_rate,
    }
}

impl RateReport {
    pub fn display_as_table(&self, pair: &str) -> String {
        let mut output = format!("Pair: {}\n", ui::style_text(pair, ui::StyleType::Title));

        if !self.days.is_empty() {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Date"),
                ui::header_cell("Rate"),
                ui::header_cell("Change (%)"),
            ]);

            for day in &self.days {
                let rate = ui::format_optional_cell(day.rate, |r| format!("{r:.4}"));
                let pct_change = day
                    .pct_change
                    .map_or_else(|| ui::na_cell(false), ui::change_cell);

                table.add_row(vec![
                    Cell::new(day.date.format("%Y-%m-%d")),
                    rate,
                    pct_change,
                ]);
            }

            output.push('\n');
            output.push_str(&table.to_string());
            output.push('\n');
        }

        let format_rate = |value: Option<f64>| {
            value.map_or_else(
                || ui::style_text("N/A", ui::StyleType::Error),
                |v| ui::style_text(&format!("{v:.4}"), ui::StyleType::TotalValue),
            )
        };

        output.push_str(&format!(
            "\nStart Rate: {}\nEnd Rate: {}\nTotal Change: {}\nMean Rate: {}",
            format_rate(self.summary.start_rate),
            format_rate(self.summary.end_rate),
            self.summary.total_pct_change.map_or_else(
                || ui::style_text("N/A", ui::StyleType::Error),
                |v| ui::style_text(&format!("{v:.2}%"), ui::StyleType::TotalValue),
            ),
            format_rate(self.summary.mean_rate),
        ));

        output
    }
}
