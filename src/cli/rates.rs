use comfy_table::Cell;

use super::session::SessionState;
use super::ui;
use crate::core::rates::is_priority;
use crate::core::{ExchangeRateTable, format_rate};

pub const TITLE: &str = "NBP sprawdź kursy walut";

impl ExchangeRateTable {
    /// Renders the table in display order. Every row whose formatted mid
    /// equals `copied` carries the badge.
    pub fn display_as_table(&self, copied: Option<&str>) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Waluta"),
            ui::header_cell("kod waluty"),
            ui::header_cell_right("Kurs (PLN)"),
        ]);

        for rate in self.sorted_rates() {
            let formatted = format_rate(rate.mid);
            let is_copied = copied == Some(formatted.as_str());
            table.add_row(vec![
                Cell::new(&rate.currency),
                ui::code_cell(&rate.code, is_priority(&rate.code)),
                ui::rate_cell(&formatted, is_copied),
            ]);
        }

        let mut output = format!(
            "{}\n{}\n",
            ui::style_text(
                &format!("Exchange Rates for {}", self.effective_date),
                ui::StyleType::Heading
            ),
            ui::style_text(&format!("Table {}", self.no), ui::StyleType::Subtle)
        );
        output.push_str(&table.to_string());
        output
    }
}

/// Renders the whole view: title and date, the error banner when set, and
/// the last loaded table (which may be older than the error).
pub fn render(state: &SessionState) -> String {
    let mut output = format!(
        "{}  {}\n",
        ui::style_text(TITLE, ui::StyleType::Title),
        state.date.format("%Y-%m-%d")
    );

    if let Some(error) = &state.error {
        output.push('\n');
        output.push_str(&ui::banner(error));
        output.push('\n');
    }

    if let Some(table) = &state.table {
        output.push('\n');
        output.push_str(&table.display_as_table(state.copied.as_deref()));
        output.push('\n');
    }

    output
}
