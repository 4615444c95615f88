use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

use super::rates::render;
use super::session::{RatesSession, wait_until_loaded};
use super::ui;
use crate::core::config::UiConfig;
use crate::core::{Clipboard, MemoryClipboard, RatesProvider};

/// Fetches the table for `date` once and returns the rendered view.
pub async fn show(provider: Arc<dyn RatesProvider>, date: NaiveDate) -> Result<String> {
    let (mut session, mut events) = RatesSession::new(
        provider,
        Arc::new(MemoryClipboard::new()),
        UiConfig::default().copied_badge_duration(),
        date,
    );

    let pb = ui::new_spinner(format!("Fetching rates for {}...", date.format("%Y-%m-%d")));
    session.start();
    wait_until_loaded(&mut session, &mut events).await;
    pb.finish_and_clear();

    Ok(render(session.state()))
}

/// Fetches the table for `date` and copies the rate of `code`. A failed
/// fetch is rendered like in the interactive view; only an unknown code or
/// an unreachable clipboard is an error.
pub async fn copy(
    provider: Arc<dyn RatesProvider>,
    clipboard: Arc<dyn Clipboard>,
    config: &UiConfig,
    date: NaiveDate,
    code: &str,
) -> Result<String> {
    let (mut session, mut events) =
        RatesSession::new(provider, clipboard, config.copied_badge_duration(), date);

    let pb = ui::new_spinner(format!("Fetching rates for {}...", date.format("%Y-%m-%d")));
    session.start();
    wait_until_loaded(&mut session, &mut events).await;
    pb.finish_and_clear();

    if session.state().table.is_some() {
        session.copy_rate(code)?;
    }
    Ok(render(session.state()))
}
