//! Core business logic abstractions

pub mod clipboard;
pub mod config;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use clipboard::{Clipboard, MemoryClipboard, TerminalClipboard};
pub use error::FetchError;
pub use rates::{ExchangeRateTable, Rate, RatesProvider, format_rate, sort_rates};
