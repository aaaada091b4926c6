use crate::domain::errors::MarketDataError;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// Settings shared by every upstream HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware.
    ///
    /// Transient failures (connect errors, 5xx, 429) are retried with
    /// exponential backoff; the per-request timeout covers a single attempt.
    pub fn create_client(settings: &HttpClientSettings) -> Result<ClientWithMiddleware> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);

        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout.min(Duration::from_secs(5)))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

/// Append percent-encoded query parameters to `base_url`.
///
/// reqwest-middleware's request builder has no `.query()`, so the full URL
/// is built up front.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<Url, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = Url::parse(base_url)?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k.as_ref(), v.as_ref());
        }
    }
    Ok(url)
}

/// Map a transport failure onto the error taxonomy.
pub fn transport_error(
    symbol: &str,
    error: &reqwest_middleware::Error,
    timeout: Duration,
) -> MarketDataError {
    match error {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => MarketDataError::Timeout {
            symbol: symbol.to_string(),
            duration_ms: timeout.as_millis() as u64,
        },
        other => MarketDataError::upstream(symbol, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_encoded() {
        let url = build_url_with_query(
            "https://example.com/v7/finance/quote",
            &[("symbols", "BRK-B,^GSPC")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v7/finance/quote?symbols=BRK-B%2C%5EGSPC"
        );
    }

    #[test]
    fn test_existing_query_is_kept() {
        let url = build_url_with_query("https://example.com/query?a=1", &[("b", "2")]).unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_no_params_leaves_url_untouched() {
        let params: [(&str, &str); 0] = [];
        let url = build_url_with_query("https://example.com/x", &params).unwrap();
        assert_eq!(url.as_str(), "https://example.com/x");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(build_url_with_query("not a url", &[("a", "b")]).is_err());
    }

    #[test]
    fn test_client_builds() {
        let settings = HttpClientSettings {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            user_agent: "marketscope-test".into(),
        };
        assert!(HttpClientFactory::create_client(&settings).is_ok());
    }
}
