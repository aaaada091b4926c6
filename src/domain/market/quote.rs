use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown for any field the upstream provider did not supply.
pub const UNKNOWN: &str = "N/A";

/// Best-effort bag of fields returned by an upstream quote provider.
///
/// Every field is optional; adapters copy what the provider sent and leave the
/// rest as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub price: Option<f64>,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<u64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    /// Epoch seconds of the last trade, when the provider reports it
    pub market_time: Option<i64>,
    // Fundamentals
    pub trailing_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub target_mean_price: Option<f64>,
}

impl RawQuote {
    /// True when the payload carries at least one field worth normalizing.
    pub fn has_market_fields(&self) -> bool {
        self.price.is_some()
            || self.current_price.is_some()
            || self.previous_close.is_some()
            || self.change.is_some()
            || self.change_percent.is_some()
            || self.volume.is_some()
            || self.market_cap.is_some()
    }

    pub fn has_fundamental_fields(&self) -> bool {
        self.market_cap.is_some()
            || self.trailing_pe.is_some()
            || self.peg_ratio.is_some()
            || self.dividend_yield.is_some()
            || self.trailing_eps.is_some()
            || self.beta.is_some()
            || self.fifty_two_week_high.is_some()
            || self.fifty_two_week_low.is_some()
            || self.target_mean_price.is_some()
            || self.sector.is_some()
            || self.industry.is_some()
    }
}

/// Canonical per-symbol quote.
///
/// Unknown upstream values stay `None`. In particular an unknown
/// `change_percent` is never read as 0% when ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<u64>,
    pub sector: String,
    pub as_of: DateTime<Utc>,
}

impl Quote {
    /// `"+3.07%"`, `"-1.26%"`, or `"N/A"`.
    pub fn change_percent_display(&self) -> String {
        match self.change_percent {
            Some(pct) if pct.is_finite() => format!("{:+.2}%", pct),
            _ => UNKNOWN.to_string(),
        }
    }

    /// Market capitalization with thousands separators, or `"N/A"`.
    pub fn market_cap_display(&self) -> String {
        self.market_cap
            .map(format_thousands)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn price_display(&self) -> String {
        format_optional(self.price, 2)
    }

    pub fn change_display(&self) -> String {
        match self.change {
            Some(change) if change.is_finite() => format!("{:+.2}", change),
            _ => UNKNOWN.to_string(),
        }
    }

    pub fn volume_display(&self) -> String {
        self.volume
            .map(format_thousands)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.symbol,
            self.price_display(),
            self.change_percent_display()
        )
    }
}

/// Valuation and profile data for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub market_cap: Option<u64>,
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub eps: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub analyst_target: Option<f64>,
    pub sector: String,
    pub industry: String,
}

impl Fundamentals {
    /// Label/value pairs in display order, unknown values rendered as `"N/A"`.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "Market Cap",
                self.market_cap
                    .map(format_thousands)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            ),
            ("P/E Ratio", format_optional(self.pe_ratio, 2)),
            ("PEG Ratio", format_optional(self.peg_ratio, 2)),
            ("Dividend Yield", format_optional(self.dividend_yield, 4)),
            ("EPS", format_optional(self.eps, 2)),
            ("Beta", format_optional(self.beta, 2)),
            ("52 Week High", format_optional(self.fifty_two_week_high, 2)),
            ("52 Week Low", format_optional(self.fifty_two_week_low, 2)),
            ("Analyst Target", format_optional(self.analyst_target, 2)),
            ("Sector", self.sector.clone()),
            ("Industry", self.industry.clone()),
        ]
    }
}

/// `2740000000000` -> `"2,740,000,000,000"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => UNKNOWN.to_string(),
    }
}
