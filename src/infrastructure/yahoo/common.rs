use crate::domain::market::RawQuote;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub result: Vec<YahooQuote>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// One entry of `quoteResponse.result`.
///
/// Aliases cover both the `regularMarket*` names of the quote endpoint and
/// the shorter names some mirrors return.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuote {
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub current_price: Option<f64>,
    #[serde(alias = "previousClose")]
    pub regular_market_previous_close: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    #[serde(alias = "volume")]
    pub regular_market_volume: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub regular_market_time: Option<i64>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    #[serde(alias = "trailingAnnualDividendYield")]
    pub dividend_yield: Option<f64>,
    #[serde(alias = "trailingEps")]
    pub eps_trailing_twelve_months: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub target_mean_price: Option<f64>,
}

fn whole(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

impl From<YahooQuote> for RawQuote {
    fn from(q: YahooQuote) -> Self {
        RawQuote {
            price: q.regular_market_price,
            current_price: q.current_price,
            previous_close: q.regular_market_previous_close,
            change: q.regular_market_change,
            change_percent: q.regular_market_change_percent,
            volume: whole(q.regular_market_volume),
            market_cap: whole(q.market_cap),
            sector: q.sector,
            industry: q.industry,
            long_name: q.long_name,
            short_name: q.short_name,
            market_time: q.regular_market_time,
            trailing_pe: q.trailing_pe,
            peg_ratio: q.peg_ratio,
            dividend_yield: q.dividend_yield,
            trailing_eps: q.eps_trailing_twelve_months,
            beta: q.beta,
            fifty_two_week_high: q.fifty_two_week_high,
            fifty_two_week_low: q.fifty_two_week_low,
            target_mean_price: q.target_mean_price,
        }
    }
}
