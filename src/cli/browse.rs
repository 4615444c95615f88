use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use console::Term;
use indicatif::ProgressBar;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::rates::render;
use super::session::RatesSession;
use super::ui;
use crate::core::config::UiConfig;
use crate::core::{Clipboard, RatesProvider};

#[derive(Debug, PartialEq)]
pub enum Input {
    Date(NaiveDate),
    Today,
    Previous,
    Next,
    Copy(String),
    Help,
    Quit,
    Nothing,
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Input::Nothing;
    };

    match first.to_lowercase().as_str() {
        "q" | "quit" | "exit" => return Input::Quit,
        "?" | "h" | "help" => return Input::Help,
        "t" | "today" => return Input::Today,
        "p" | "prev" => return Input::Previous,
        "n" | "next" => return Input::Next,
        "c" | "copy" => {
            return match words.next() {
                Some(code) => Input::Copy(code.to_uppercase()),
                None => Input::Invalid("Usage: copy <CODE>".to_string()),
            };
        }
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
        return Input::Date(date);
    }
    if first.len() == 3 && first.chars().all(|c| c.is_ascii_alphabetic()) {
        return Input::Copy(first.to_uppercase());
    }
    Input::Invalid(format!("Not a date (YYYY-MM-DD) or currency code: {line}"))
}

const HELP: &str =
    "Enter a date (YYYY-MM-DD), today, prev, next, a currency code to copy its rate, or quit.";

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

struct Screen {
    term: Term,
    spinner: Option<ProgressBar>,
}

impl Screen {
    fn draw(&mut self, session: &RatesSession, notice: Option<&str>) -> Result<()> {
        let state = session.state();
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }

        self.term.clear_screen()?;
        self.term.write_line(&render(state))?;
        if let Some(notice) = notice {
            self.term.write_line(notice)?;
        }
        self.term.write_line(&ui::style_text(HELP, ui::StyleType::Subtle))?;

        if state.loading {
            self.spinner = Some(ui::new_spinner(format!(
                "Fetching rates for {}...",
                state.date.format("%Y-%m-%d")
            )));
        }
        Ok(())
    }
}

/// Interactive session: reads commands from stdin and redraws whenever the
/// state changes.
pub async fn run(
    provider: Arc<dyn RatesProvider>,
    clipboard: Arc<dyn Clipboard>,
    config: &UiConfig,
    date: NaiveDate,
) -> Result<()> {
    let (mut session, mut events) =
        RatesSession::new(provider, clipboard, config.copied_badge_duration(), date);
    let mut screen = Screen {
        term: Term::stdout(),
        spinner: None,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.start();
    screen.draw(&session, None)?;

    loop {
        let notice = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                let input = parse_input(&line);
                debug!(?input, "Parsed input");
                match input {
                    Input::Quit => break,
                    Input::Nothing => None,
                    Input::Help => Some(HELP.to_string()),
                    Input::Invalid(message) => Some(ui::style_text(&message, ui::StyleType::Error)),
                    Input::Date(date) => {
                        session.select_date(date);
                        None
                    }
                    Input::Today => {
                        session.select_date(today());
                        None
                    }
                    Input::Previous => {
                        if let Some(date) = session.state().date.checked_sub_days(Days::new(1)) {
                            session.select_date(date);
                        }
                        None
                    }
                    Input::Next => {
                        if let Some(date) = session.state().date.checked_add_days(Days::new(1)) {
                            session.select_date(date);
                        }
                        None
                    }
                    Input::Copy(code) => match session.copy_rate(&code) {
                        Ok(formatted) => Some(ui::style_text(
                            &format!("Copied {code} {formatted}"),
                            ui::StyleType::Success,
                        )),
                        Err(e) => Some(ui::style_text(&e.to_string(), ui::StyleType::Error)),
                    },
                }
            }
            Some(event) = events.recv() => {
                if !session.apply(event) {
                    continue;
                }
                None
            }
        };
        screen.draw(&session, notice.as_deref())?;
    }

    if let Some(spinner) = screen.spinner.take() {
        spinner.finish_and_clear();
    }
    Ok(())
}
