//! State of one interactive rates session.
//!
//! The session owns everything the user sees: the selected date, the last
//! loaded table, the loading flag, the error banner and the "Copied" badge.
//! Fetches and badge timers run as spawned tasks and report back through a
//! channel; only [`RatesSession::apply`] mutates state, so the owner of the
//! receiving end decides when changes become visible.

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::core::{Clipboard, ExchangeRateTable, FetchError, RatesProvider, format_rate};

#[derive(Debug)]
pub enum SessionEvent {
    FetchCompleted {
        seq: u64,
        date: NaiveDate,
        result: Result<Option<ExchangeRateTable>, FetchError>,
    },
    BadgeExpired {
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub date: NaiveDate,
    /// Survives a failed fetch, so a stale table stays under the banner.
    /// Cleared when a successful response carries no table.
    pub table: Option<ExchangeRateTable>,
    pub loading: bool,
    pub error: Option<String>,
    /// Formatted value of the last copied rate while its badge is visible.
    pub copied: Option<String>,
}

pub struct RatesSession {
    state: SessionState,
    provider: Arc<dyn RatesProvider>,
    clipboard: Arc<dyn Clipboard>,
    badge_duration: Duration,
    events: UnboundedSender<SessionEvent>,
    latest_fetch: u64,
    badge_generation: u64,
    badge_timer: Option<JoinHandle<()>>,
}

impl RatesSession {
    pub fn new(
        provider: Arc<dyn RatesProvider>,
        clipboard: Arc<dyn Clipboard>,
        badge_duration: Duration,
        date: NaiveDate,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = RatesSession {
            state: SessionState {
                date,
                table: None,
                loading: false,
                error: None,
                copied: None,
            },
            provider,
            clipboard,
            badge_duration,
            events,
            latest_fetch: 0,
            badge_generation: 0,
            badge_timer: None,
        };
        (session, receiver)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Fetches the table for the current date, as on first display.
    pub fn start(&mut self) {
        self.select_date(self.state.date);
    }

    /// Changes the selected date and starts fetching its table. Earlier
    /// fetches keep running but their results will be ignored.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.latest_fetch += 1;
        let seq = self.latest_fetch;
        debug!(%date, seq, "Selecting date");

        self.state.date = date;
        self.state.loading = true;
        self.state.error = None;

        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = provider.fetch_table(date).await;
            // The receiver is gone once the session is torn down
            let _ = events.send(SessionEvent::FetchCompleted { seq, date, result });
        });
    }

    /// Applies a completed background task. Returns whether the visible
    /// state changed.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::FetchCompleted { seq, date, result } => {
                if seq != self.latest_fetch {
                    debug!(%date, seq, latest = self.latest_fetch, "Discarding superseded fetch");
                    return false;
                }
                self.state.loading = false;
                match result {
                    Ok(Some(table)) => {
                        debug!(%date, no = %table.no, "Rate table loaded");
                        self.state.table = Some(table);
                        self.state.error = None;
                    }
                    Ok(None) => {
                        debug!(%date, "Response held no table");
                        self.state.table = None;
                        self.state.error = None;
                    }
                    Err(e) => {
                        debug!(%date, error = %e, "Rate table fetch failed");
                        self.state.error = Some(e.to_string());
                    }
                }
                true
            }
            SessionEvent::BadgeExpired { generation } => {
                if generation != self.badge_generation {
                    return false;
                }
                self.badge_timer = None;
                self.state.copied.take().is_some()
            }
        }
    }

    /// Copies the formatted mid rate of `code` and shows the badge for it.
    pub fn copy_rate(&mut self, code: &str) -> Result<String> {
        let table = self
            .state
            .table
            .as_ref()
            .ok_or_else(|| anyhow!("No rate table loaded yet"))?;
        let rate = table
            .find(code)
            .ok_or_else(|| anyhow!("No rate for currency code: {}", code.to_uppercase()))?;
        let formatted = format_rate(rate.mid);

        self.clipboard.write_text(&formatted)?;
        debug!(code = %rate.code, %formatted, "Copied rate");
        self.state.copied = Some(formatted.clone());
        self.arm_badge_timer();
        Ok(formatted)
    }

    fn arm_badge_timer(&mut self) {
        if let Some(timer) = self.badge_timer.take() {
            timer.abort();
        }
        self.badge_generation += 1;
        let generation = self.badge_generation;
        let deadline = Instant::now() + self.badge_duration;
        let events = self.events.clone();
        self.badge_timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(SessionEvent::BadgeExpired { generation });
        }));
    }
}

/// Applies events until the latest fetch has completed.
pub async fn wait_until_loaded(
    session: &mut RatesSession,
    events: &mut UnboundedReceiver<SessionEvent>,
) {
    while session.state().loading {
        match events.recv().await {
            Some(event) => {
                session.apply(event);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NO_RATES_MESSAGE;
    use crate::core::{MemoryClipboard, Rate};
    use async_trait::async_trait;
    use std::collections::HashMap;

    const BADGE: Duration = Duration::from_millis(1500);

    struct StubProvider {
        tables: HashMap<NaiveDate, (Duration, Result<Option<ExchangeRateTable>, FetchError>)>,
    }

    #[async_trait]
    impl RatesProvider for StubProvider {
        async fn fetch_table(
            &self,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRateTable>, FetchError> {
            let (delay, result) = self
                .tables
                .get(&date)
                .cloned()
                .unwrap_or((Duration::ZERO, Err(FetchError::NoRatesForDate { status: 404 })));
            tokio::time::sleep(delay).await;
            result
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table(effective_date: &str, rates: &[(&str, f64)]) -> ExchangeRateTable {
        ExchangeRateTable {
            table: "A".to_string(),
            no: format!("1/A/NBP/{effective_date}"),
            effective_date: effective_date.to_string(),
            rates: rates
                .iter()
                .map(|(code, mid)| Rate {
                    currency: code.to_lowercase(),
                    code: code.to_string(),
                    mid: *mid,
                })
                .collect(),
        }
    }

    fn session_with(
        entries: Vec<(&str, Duration, Result<Option<ExchangeRateTable>, FetchError>)>,
    ) -> (RatesSession, UnboundedReceiver<SessionEvent>, Arc<MemoryClipboard>) {
        let tables = entries
            .into_iter()
            .map(|(d, delay, result)| (date(d), (delay, result)))
            .collect();
        let clipboard = Arc::new(MemoryClipboard::new());
        let (session, events) = RatesSession::new(
            Arc::new(StubProvider { tables }),
            clipboard.clone(),
            BADGE,
            date("2024-10-14"),
        );
        (session, events, clipboard)
    }

    #[tokio::test]
    async fn test_start_loads_initial_date() {
        let loaded = table("2024-10-14", &[("USD", 3.9376), ("EUR", 4.2961)]);
        let (mut session, mut events, _) =
            session_with(vec![("2024-10-14", Duration::ZERO, Ok(Some(loaded.clone())))]);

        session.start();
        assert!(session.state().loading);
        assert!(session.state().table.is_none());

        wait_until_loaded(&mut session, &mut events).await;
        assert!(!session.state().loading);
        assert_eq!(session.state().table.as_ref(), Some(&loaded));
        assert!(session.state().error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_table() {
        let weekday = table("2024-10-11", &[("EUR", 4.3)]);
        let (mut session, mut events, _) =
            session_with(vec![("2024-10-11", Duration::ZERO, Ok(Some(weekday.clone())))]);

        session.select_date(date("2024-10-11"));
        wait_until_loaded(&mut session, &mut events).await;

        // Saturday, the stub answers 404
        session.select_date(date("2024-10-12"));
        assert!(session.state().error.is_none());
        wait_until_loaded(&mut session, &mut events).await;

        let state = session.state();
        assert_eq!(state.date, date("2024-10-12"));
        assert_eq!(state.error.as_deref(), Some(NO_RATES_MESSAGE));
        assert_eq!(state.table.as_ref(), Some(&weekday));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let weekday = table("2024-10-14", &[("EUR", 4.3)]);
        let (mut session, mut events, _) =
            session_with(vec![("2024-10-14", Duration::ZERO, Ok(Some(weekday)))]);

        session.select_date(date("2024-10-13"));
        wait_until_loaded(&mut session, &mut events).await;
        assert!(session.state().error.is_some());

        session.select_date(date("2024-10-14"));
        wait_until_loaded(&mut session, &mut events).await;
        assert!(session.state().error.is_none());
        assert_eq!(
            session.state().table.as_ref().map(|t| t.effective_date.as_str()),
            Some("2024-10-14")
        );
    }

    #[tokio::test]
    async fn test_empty_response_clears_table_without_banner() {
        let weekday = table("2024-10-11", &[("EUR", 4.3)]);
        let (mut session, mut events, _) = session_with(vec![
            ("2024-10-11", Duration::ZERO, Ok(Some(weekday))),
            ("2024-10-14", Duration::ZERO, Ok(None)),
        ]);

        session.select_date(date("2024-10-11"));
        wait_until_loaded(&mut session, &mut events).await;
        assert!(session.state().table.is_some());

        session.select_date(date("2024-10-14"));
        wait_until_loaded(&mut session, &mut events).await;
        let state = session.state();
        assert!(state.table.is_none());
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_discarded() {
        let slow = table("2024-10-10", &[("EUR", 4.1)]);
        let fast = table("2024-10-11", &[("EUR", 4.2)]);
        let (mut session, mut events, _) = session_with(vec![
            ("2024-10-10", Duration::from_millis(300), Ok(Some(slow))),
            ("2024-10-11", Duration::from_millis(50), Ok(Some(fast.clone()))),
        ]);

        session.select_date(date("2024-10-10"));
        session.select_date(date("2024-10-11"));

        let first = events.recv().await.unwrap();
        assert!(matches!(first, SessionEvent::FetchCompleted { seq: 2, .. }));
        assert!(session.apply(first));
        assert_eq!(session.state().table.as_ref(), Some(&fast));
        assert!(!session.state().loading);

        let second = events.recv().await.unwrap();
        assert!(matches!(second, SessionEvent::FetchCompleted { seq: 1, .. }));
        assert!(!session.apply(second));
        assert_eq!(session.state().table.as_ref(), Some(&fast));
        assert_eq!(session.state().date, date("2024-10-11"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_shows_badge_until_timeout() {
        let loaded = table("2024-10-14", &[("USD", 3.9376), ("EUR", 4.2137)]);
        let (mut session, mut events, clipboard) =
            session_with(vec![("2024-10-14", Duration::ZERO, Ok(Some(loaded)))]);
        session.start();
        wait_until_loaded(&mut session, &mut events).await;

        let copied_at = Instant::now();
        let formatted = session.copy_rate("eur").unwrap();
        assert_eq!(formatted, "4,2137");
        assert_eq!(clipboard.contents().as_deref(), Some("4,2137"));
        assert_eq!(session.state().copied.as_deref(), Some("4,2137"));

        let event = events.recv().await.unwrap();
        let elapsed = copied_at.elapsed();
        assert!(elapsed >= BADGE && elapsed < BADGE + Duration::from_millis(10));
        assert!(session.apply(event));
        assert!(session.state().copied.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_copy_rearms_badge_timer() {
        let loaded = table("2024-10-14", &[("USD", 3.9376), ("EUR", 4.2137)]);
        let (mut session, mut events, clipboard) =
            session_with(vec![("2024-10-14", Duration::ZERO, Ok(Some(loaded)))]);
        session.start();
        wait_until_loaded(&mut session, &mut events).await;

        session.copy_rate("EUR").unwrap();
        tokio::time::advance(Duration::from_millis(1000)).await;
        let second_copy = Instant::now();
        session.copy_rate("USD").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("3,9376"));
        assert_eq!(session.state().copied.as_deref(), Some("3,9376"));

        loop {
            let event = events.recv().await.unwrap();
            if session.apply(event) {
                break;
            }
        }
        assert!(second_copy.elapsed() >= BADGE);
        assert!(session.state().copied.is_none());
    }

    #[tokio::test]
    async fn test_copy_unknown_code_leaves_state_untouched() {
        let loaded = table("2024-10-14", &[("EUR", 4.2137)]);
        let (mut session, mut events, clipboard) =
            session_with(vec![("2024-10-14", Duration::ZERO, Ok(Some(loaded)))]);

        let err = session.copy_rate("EUR").unwrap_err();
        assert_eq!(err.to_string(), "No rate table loaded yet");

        session.start();
        wait_until_loaded(&mut session, &mut events).await;
        let err = session.copy_rate("xyz").unwrap_err();
        assert_eq!(err.to_string(), "No rate for currency code: XYZ");
        assert!(session.state().copied.is_none());
        assert!(clipboard.contents().is_none());
    }
}
