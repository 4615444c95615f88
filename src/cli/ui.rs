use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Heading,
    Error,
    Success,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().blue(),
        StyleType::Heading => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Success => style(text).green(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn header_cell_right(text: &str) -> Cell {
    header_cell(text).set_alignment(CellAlignment::Right)
}

/// Currency code cell, bold for the priority currencies.
pub fn code_cell(code: &str, highlighted: bool) -> Cell {
    let cell = Cell::new(code).fg(Color::Blue);
    if highlighted {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

pub fn rate_cell(formatted: &str, copied: bool) -> Cell {
    if copied {
        Cell::new(format!("{formatted}  ✓ Copied"))
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(formatted).set_alignment(CellAlignment::Right)
    }
}

/// Inline error banner, red with a left border.
pub fn banner(message: &str) -> String {
    style_text(&format!("▌ {message}"), StyleType::Error)
}

/// Creates a spinner shown while a request is in flight.
pub fn new_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
