//! Write-only clipboard access

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use console::Term;
use std::sync::Mutex;
use tracing::debug;

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Sets the system clipboard through the terminal with an OSC 52 sequence.
/// Works locally and over SSH as long as the terminal emulator allows it.
pub struct TerminalClipboard {
    term: Term,
}

impl TerminalClipboard {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TerminalClipboard {
    fn default() -> Self {
        Self::new()
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", B64.encode(text))
}

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if !self.term.is_term() {
            return Err(anyhow!("stdout is not a terminal, cannot reach the clipboard"));
        }
        self.term
            .write_str(&osc52_sequence(text))
            .context("Failed to write clipboard sequence to terminal")?;
        self.term.flush()?;
        debug!(text, "Wrote clipboard contents");
        Ok(())
    }
}

/// Keeps the last written text in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| anyhow!("Clipboard lock poisoned: {e}"))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
