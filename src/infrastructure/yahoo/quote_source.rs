use super::common::{QuoteEnvelope, YahooQuote};
use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::RawQuote;
use crate::domain::ports::QuoteSource;
use crate::infrastructure::core::http_client_factory::{build_url_with_query, transport_error};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Duration;
use tracing::{debug, trace};

/// Quote provider backed by the Yahoo Finance `v7/finance/quote` endpoint.
pub struct YahooQuoteSource {
    client: ClientWithMiddleware,
    base_url: String,
    timeout: Duration,
}

impl YahooQuoteSource {
    pub fn new(client: ClientWithMiddleware, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_quote(&self, symbol: &str) -> MarketDataResult<RawQuote> {
        let url = build_url_with_query(
            &format!("{}/v7/finance/quote", self.base_url),
            &[("symbols", symbol)],
        )
        .map_err(|e| MarketDataError::upstream(symbol, format!("bad base url: {}", e)))?;

        debug!("YahooQuoteSource: GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(symbol, &e, self.timeout))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::not_found(symbol));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::upstream(
                symbol,
                format!("HTTP {}: {}", status, truncate(&body, 200)),
            ));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    symbol: symbol.to_string(),
                    duration_ms: self.timeout.as_millis() as u64,
                }
            } else {
                MarketDataError::upstream(symbol, e.to_string())
            }
        })?;
        trace!("YahooQuoteSource: {} bytes for {}", body.len(), symbol);

        parse_quote_response(symbol, &body)
    }
}

/// Decode a quote endpoint body into the raw field bag for `symbol`.
///
/// An empty `result` list is `NotFound`. Entries for other symbols are never
/// substituted: a list without a match is `MalformedResponse`, as is anything
/// that is not the expected envelope.
pub fn parse_quote_response(symbol: &str, body: &str) -> MarketDataResult<RawQuote> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)
        .map_err(|e| MarketDataError::malformed(symbol, format!("invalid quote JSON: {}", e)))?;

    let response = envelope.quote_response;
    if let Some(error) = response.error.filter(|e| !e.is_null()) {
        debug!("YahooQuoteSource: provider error for {}: {}", symbol, error);
    }

    let mut results = response.result;
    let position = results.iter().position(|q: &YahooQuote| {
        q.symbol
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
    });

    let quote = match position {
        Some(idx) => results.swap_remove(idx),
        // A lone entry without a symbol field is taken as the answer
        None if results.len() == 1 && results[0].symbol.is_none() => results.swap_remove(0),
        None if results.is_empty() => return Err(MarketDataError::not_found(symbol)),
        None => {
            let returned: Vec<&str> = results
                .iter()
                .filter_map(|q| q.symbol.as_deref())
                .collect();
            return Err(MarketDataError::malformed(
                symbol,
                format!("no matching entry in quote response (got {})", returned.join(", ")),
            ));
        }
    };

    Ok(RawQuote::from(quote))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
