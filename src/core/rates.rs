//! Exchange rate tables and their display ordering

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::FetchError;

/// Currencies always listed first, in this order.
pub const PRIORITY_CURRENCIES: [&str; 4] = ["EUR", "USD", "GBP", "CHF"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub currency: String,
    pub code: String,
    /// PLN per one unit of the foreign currency.
    pub mid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateTable {
    pub table: String,
    pub no: String,
    pub effective_date: String,
    pub rates: Vec<Rate>,
}

impl ExchangeRateTable {
    /// Checks that codes are unique and mid rates are non-negative.
    pub fn validate(&self) -> Result<(), FetchError> {
        let mut seen = HashSet::new();
        for rate in &self.rates {
            if !seen.insert(rate.code.as_str()) {
                return Err(FetchError::InvalidTable(format!(
                    "duplicate currency code {} in table {}",
                    rate.code, self.no
                )));
            }
            if !rate.mid.is_finite() || rate.mid < 0.0 {
                return Err(FetchError::InvalidTable(format!(
                    "invalid mid rate {} for {} in table {}",
                    rate.mid, rate.code, self.no
                )));
            }
        }
        Ok(())
    }

    pub fn find(&self, code: &str) -> Option<&Rate> {
        self.rates.iter().find(|r| r.code.eq_ignore_ascii_case(code))
    }

    pub fn sorted_rates(&self) -> Vec<&Rate> {
        sort_rates(&self.rates)
    }
}

#[async_trait]
pub trait RatesProvider: Send + Sync {
    /// `Ok(None)` when the source answered successfully but published no
    /// table.
    async fn fetch_table(&self, date: NaiveDate) -> Result<Option<ExchangeRateTable>, FetchError>;
}

fn priority_index(code: &str) -> Option<usize> {
    PRIORITY_CURRENCIES.iter().position(|p| *p == code)
}

pub fn is_priority(code: &str) -> bool {
    priority_index(code).is_some()
}

/// Orders rates with the priority currencies first. Everything else keeps
/// the order the API returned it in.
pub fn sort_rates(rates: &[Rate]) -> Vec<&Rate> {
    let mut sorted: Vec<&Rate> = rates.iter().collect();
    // stable: all non-priority codes share one key
    sorted.sort_by_key(|r| priority_index(&r.code).unwrap_or(PRIORITY_CURRENCIES.len()));
    sorted
}

/// Four decimal digits with a decimal comma, e.g. `4,2137`.
pub fn format_rate(mid: f64) -> String {
    to_fixed(mid, 4).replace('.', ",")
}

/// Fixed-point notation with ties rounded away from zero, the way
/// `Number.prototype.toFixed` rounds. `format!("{:.N}")` rounds ties to
/// even, which turns 0.03125 into 0.0312 instead of 0.0313.
fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // -0.0 < 0.0 is false, so negative zero prints unsigned
    let sign = if value < 0.0 { "-" } else { "" };

    // every f64 has a terminating expansion of at most 1074 fractional digits
    let exact = format!("{:.1074}", value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let round_up = frac_part
        .as_bytes()
        .get(digits)
        .is_some_and(|d| *d >= b'5');

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();
    if round_up {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let (whole, fraction) = kept.split_at(split);
    let whole = String::from_utf8_lossy(whole);
    if digits == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{}", String::from_utf8_lossy(fraction))
    }
}
