use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::DailyBar;
use crate::domain::ports::{OutputSize, TimeSeriesSource};
use crate::infrastructure::core::http_client_factory::{build_url_with_query, transport_error};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const SERIES_KEY: &str = "Time Series (Daily)";
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Daily series from the Alpha Vantage `TIME_SERIES_DAILY` function.
pub struct AlphaVantageTimeSeries {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl AlphaVantageTimeSeries {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl TimeSeriesSource for AlphaVantageTimeSeries {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        output_size: OutputSize,
    ) -> MarketDataResult<Vec<DailyBar>> {
        let url = build_url_with_query(
            &self.base_url,
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", output_size.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| MarketDataError::upstream(symbol, format!("bad base url: {}", e)))?;

        debug!(
            "AlphaVantageTimeSeries: requesting {} daily series for {}",
            output_size.as_str(),
            symbol
        );
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(symbol, &e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::upstream(symbol, format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MarketDataError::malformed(symbol, format!("invalid JSON: {}", e)))?;

        parse_daily_series(symbol, &body)
    }
}

/// Extract daily bars from a `TIME_SERIES_DAILY` body.
///
/// A body without the series object (error page, rate-limit note) is
/// `MalformedResponse` carrying the provider's message. Individual rows that
/// fail to parse are skipped.
pub fn parse_daily_series(symbol: &str, body: &Value) -> MarketDataResult<Vec<DailyBar>> {
    let Some(series) = body.get(SERIES_KEY).and_then(Value::as_object) else {
        let notice = NOTICE_KEYS
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .unwrap_or("response has no daily time series");
        return Err(MarketDataError::malformed(symbol, notice));
    };

    let mut bars = Vec::with_capacity(series.len());
    for (date, row) in series {
        match parse_row(date, row) {
            Some(bar) => bars.push(bar),
            None => debug!("AlphaVantageTimeSeries: skipping bad row {} for {}", date, symbol),
        }
    }

    if bars.len() < series.len() {
        warn!(
            "AlphaVantageTimeSeries: {} of {} rows unreadable for {}",
            series.len() - bars.len(),
            series.len(),
            symbol
        );
    }
    Ok(bars)
}

fn parse_row(date: &str, row: &Value) -> Option<DailyBar> {
    let field = |key: &str| -> Option<f64> {
        row.get(key)?
            .as_str()?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };

    let volume = field("5. volume").filter(|v| *v >= 0.0)?;
    Some(DailyBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
        open: field("1. open")?,
        high: field("2. high")?,
        low: field("3. low")?,
        close: field("4. close")?,
        volume: volume.round() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_series() {
        let body = json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-03-08": {
                    "1. open": "195.00", "2. high": "197.50",
                    "3. low": "194.10", "4. close": "196.20", "5. volume": "4123456"
                },
                "2024-03-07": {
                    "1. open": "193.00", "2. high": "195.40",
                    "3. low": "192.80", "4. close": "195.00", "5. volume": "3900000"
                }
            }
        });
        let mut bars = parse_daily_series("IBM", &body).unwrap();
        bars.sort_by_key(|b| b.date);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(bars[1].close, 196.20);
        assert_eq!(bars[1].volume, 4_123_456);
    }

    #[test]
    fn test_rate_limit_note_is_malformed() {
        let body = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."});
        match parse_daily_series("IBM", &body) {
            Err(MarketDataError::MalformedResponse { reason, .. }) => {
                assert!(reason.contains("call frequency"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_message_is_malformed() {
        let body = json!({"Error Message": "Invalid API call."});
        assert_eq!(
            parse_daily_series("ZZZZINVALID", &body),
            Err(MarketDataError::malformed("ZZZZINVALID", "Invalid API call."))
        );
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let body = json!({
            "Time Series (Daily)": {
                "2024-03-08": {"1. open": "x", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"},
                "not-a-date": {"1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "1"},
                "2024-03-07": {"1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5", "5. volume": "10.0"}
            }
        });
        let bars = parse_daily_series("X", &body).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 10);
    }
}
