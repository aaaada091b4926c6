use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::quote::UNKNOWN;
use crate::domain::market::symbol::normalize_symbol;
use crate::domain::market::{Fundamentals, Quote, RawQuote};
use chrono::{TimeZone, Utc};
use tracing::warn;

/// Turn a raw provider payload into a canonical [`Quote`].
///
/// Returns `NotFound` when the payload carries no market fields at all, so a
/// caller can never mistake an empty answer for a zero-valued quote.
pub fn normalize_quote(symbol: &str, raw: &RawQuote) -> MarketDataResult<Quote> {
    let symbol = normalize_symbol(symbol)?;

    if !raw.has_market_fields() {
        return Err(MarketDataError::NotFound { symbol });
    }

    let price = finite(raw.price).or(finite(raw.current_price));
    let previous_close = finite(raw.previous_close);

    let derived_change = match (price, previous_close) {
        (Some(p), Some(prev)) => Some(p - prev),
        _ => None,
    };
    let derived_pct = match (price, previous_close) {
        (Some(p), Some(prev)) if prev > 0.0 => Some((p - prev) / prev * 100.0),
        _ => None,
    };

    let mut change = finite(raw.change).or(derived_change);
    let mut change_percent = finite(raw.change_percent).or(derived_pct);

    if let (Some(c), Some(pct)) = (change, change_percent) {
        if !signs_agree(c, pct) {
            warn!(
                "QuoteNormalizer: {} change {:+.4} disagrees with change percent {:+.4}",
                symbol, c, pct
            );
            // Prefer the values implied by price and previous close
            match (derived_change, derived_pct) {
                (Some(dc), Some(dp)) => {
                    change = Some(dc);
                    change_percent = Some(dp);
                }
                _ => {
                    change = None;
                    change_percent = None;
                }
            }
        }
    }

    let name = non_blank(raw.long_name.as_deref())
        .or(non_blank(raw.short_name.as_deref()))
        .unwrap_or(symbol.as_str())
        .to_string();

    let sector = non_blank(raw.sector.as_deref())
        .unwrap_or(UNKNOWN)
        .to_string();

    let as_of = raw
        .market_time
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol,
        name,
        price,
        change,
        change_percent,
        volume: raw.volume,
        market_cap: raw.market_cap,
        sector,
        as_of,
    })
}

/// Extract the fundamentals subset of a raw payload.
pub fn normalize_fundamentals(symbol: &str, raw: &RawQuote) -> MarketDataResult<Fundamentals> {
    let symbol = normalize_symbol(symbol)?;

    if !raw.has_fundamental_fields() {
        return Err(MarketDataError::NotFound { symbol });
    }

    Ok(Fundamentals {
        symbol,
        market_cap: raw.market_cap,
        pe_ratio: finite(raw.trailing_pe),
        peg_ratio: finite(raw.peg_ratio),
        dividend_yield: finite(raw.dividend_yield),
        eps: finite(raw.trailing_eps),
        beta: finite(raw.beta),
        fifty_two_week_high: finite(raw.fifty_two_week_high),
        fifty_two_week_low: finite(raw.fifty_two_week_low),
        analyst_target: finite(raw.target_mean_price),
        sector: non_blank(raw.sector.as_deref())
            .unwrap_or(UNKNOWN)
            .to_string(),
        industry: non_blank(raw.industry.as_deref())
            .unwrap_or(UNKNOWN)
            .to_string(),
    })
}

/// Zero agrees with either sign.
fn signs_agree(a: f64, b: f64) -> bool {
    a == 0.0 || b == 0.0 || a.is_sign_positive() == b.is_sign_positive()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
