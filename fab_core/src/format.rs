//! # Display Formatting
//!
//! Currency and duration strings for reports and the CLI. The engine never
//! rounds; rounding happens only here, at presentation time.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::format::{format_currency, format_minutes, CurrencyFormat};
//!
//! assert_eq!(format_currency(1234567.891, &CurrencyFormat::default()), "₹12,34,567.89");
//! assert_eq!(format_minutes(95.0), "1h 35m");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::Minutes;

/// Thousands grouping convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberLocale {
    /// Indian grouping: last three digits, then pairs (12,34,567)
    #[default]
    #[serde(rename = "en-IN", alias = "EnIn")]
    EnIn,
    /// Western grouping: threes (1,234,567)
    #[serde(rename = "en-US", alias = "EnUs")]
    EnUs,
}

impl NumberLocale {
    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en-in" | "enin" | "in" | "indian" => Some(NumberLocale::EnIn),
            "en-us" | "enus" | "us" | "western" => Some(NumberLocale::EnUs),
            _ => None,
        }
    }

    /// Locale tag
    pub fn tag(&self) -> &'static str {
        match self {
            NumberLocale::EnIn => "en-IN",
            NumberLocale::EnUs => "en-US",
        }
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Currency symbol and grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub locale: NumberLocale,
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, locale: NumberLocale) -> Self {
        CurrencyFormat {
            symbol: symbol.into(),
            locale,
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::new("₹", NumberLocale::EnIn)
    }
}

/// Symbol, grouped integer part and exactly two decimals.
pub fn format_currency(amount: f64, format: &CurrencyFormat) -> String {
    if !amount.is_finite() {
        return format!("{}{}", format.symbol, amount);
    }
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!(
        "{}{}{}.{}",
        sign,
        format.symbol,
        group_digits(int_part, format.locale),
        frac_part
    )
}

/// Like [`format_currency`] but drops a zero fraction (`₹900`, `₹2.5`).
///
/// Used for per-unit rates inside detail lines.
pub fn format_rate(amount: f64, format: &CurrencyFormat) -> String {
    let full = format_currency(amount, format);
    match full.rsplit_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => full,
    }
}

/// Plain quantity (lengths, hours) with at most three decimals and no
/// trailing zeros: `4`, `2.25`, `3.3`.
pub fn format_quantity(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Group an unsigned run of digits.
fn group_digits(digits: &str, locale: NumberLocale) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(len - 3);
    let group = match locale {
        NumberLocale::EnIn => 2,
        NumberLocale::EnUs => 3,
    };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > group {
        groups.push(&head[end - group..end]);
        end -= group;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Read a number typed with optional thousands separators.
///
/// Commas are accepted only where [`format_currency`] would place them for
/// some [`NumberLocale`]; `1,5` or `1,23` are rejected rather than read as
/// `15` or `123`.
pub fn parse_grouped_number(text: &str) -> Option<f64> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text, None),
    };
    if frac_part.is_some_and(|frac| frac.contains(',')) {
        return None;
    }

    let digits = int_part.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(int_part);
    if digits.contains(',') {
        let groups: Vec<&str> = digits.split(',').collect();
        let all_digits = groups
            .iter()
            .all(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()));
        if !all_digits || !(is_grouped(&groups, NumberLocale::EnIn) || is_grouped(&groups, NumberLocale::EnUs)) {
            return None;
        }
    }

    text.replace(',', "").parse().ok()
}

fn is_grouped(groups: &[&str], locale: NumberLocale) -> bool {
    let inner = match locale {
        NumberLocale::EnIn => 2,
        NumberLocale::EnUs => 3,
    };
    let Some((last, leading)) = groups.split_last() else {
        return false;
    };
    let Some((first, middle)) = leading.split_first() else {
        return false;
    };
    last.len() == 3 && (1..=inner).contains(&first.len()) && middle.iter().all(|g| g.len() == inner)
}

/// Minutes as `45min`, `1h 35m` or `1d 1h`, rounded to whole minutes.
///
/// Zero hour and minute segments are left out (`2h`, `1d`).
pub fn format_minutes(minutes: f64) -> String {
    let (days, hours, mins) = Minutes(minutes).split_dhm();

    if days == 0 && hours == 0 {
        return format!("{}min", mins);
    }

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days == 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    parts.join(" ")
}
