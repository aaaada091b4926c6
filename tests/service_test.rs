use marketscope::config::{
    AlphaVantageConfig, Config, HistoryEnvConfig, Mode, ObservabilityEnvConfig, ProviderEnvConfig,
    SnapshotEnvConfig, YahooConfig,
};
use marketscope::domain::errors::MarketDataError;
use marketscope::domain::market::RawQuote;
use marketscope::infrastructure::ServiceFactory;
use marketscope::infrastructure::mock::{MockQuoteSource, MockTimeSeriesSource};
use std::sync::Arc;
use std::time::Duration;

fn config(universe: &[&str]) -> Config {
    Config {
        mode: Mode::Mock,
        providers: ProviderEnvConfig {
            yahoo: YahooConfig {
                base_url: "http://127.0.0.1:9".into(),
                user_agent: "test".into(),
            },
            alpha_vantage: AlphaVantageConfig {
                base_url: "http://127.0.0.1:9/query".into(),
                api_key: "demo".into(),
            },
            timeout: Duration::from_secs(10),
            max_retries: 0,
        },
        snapshot: SnapshotEnvConfig {
            ttl: Duration::from_secs(300),
            top_n: 2,
            universe: universe.iter().map(|s| s.to_string()).collect(),
            fetch_concurrency: 4,
        },
        history: HistoryEnvConfig {
            length: 126,
            lookback_days: 180,
            synthetic_base_price: 150.0,
            synthetic_seed: Some(11),
        },
        observability: ObservabilityEnvConfig::default(),
    }
}

fn apple() -> RawQuote {
    RawQuote {
        price: Some(189.5),
        previous_close: Some(187.0),
        volume: Some(51_234_567),
        market_cap: Some(2_740_000_000_000),
        long_name: Some("Apple Inc.".into()),
        sector: Some("Technology".into()),
        industry: Some("Consumer Electronics".into()),
        trailing_pe: Some(29.4),
        beta: Some(1.29),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_quote_is_normalized() {
    let quotes = Arc::new(MockQuoteSource::new().with_quote("AAPL", apple()));
    let service = ServiceFactory::assemble(
        &config(&["AAPL"]),
        quotes,
        Arc::new(MockTimeSeriesSource::new()),
        None,
    );

    let quote = service.get_quote("aapl").await.unwrap();
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.name, "Apple Inc.");
    assert_eq!(quote.change_percent_display(), "+1.34%");
    assert_eq!(quote.market_cap_display(), "2,740,000,000,000");
}

#[tokio::test]
async fn test_unknown_symbol_quote_is_not_found_but_history_is_synthetic() {
    let service = ServiceFactory::assemble(
        &config(&["AAPL"]),
        Arc::new(MockQuoteSource::new()),
        Arc::new(MockTimeSeriesSource::new()),
        None,
    );

    assert_eq!(
        service.get_quote("ZZZZINVALID").await,
        Err(MarketDataError::not_found("ZZZZINVALID"))
    );

    let series = service.get_historical_series("ZZZZINVALID").await.unwrap();
    assert!(series.is_synthetic());
    assert_eq!(series.len(), 126);
}

#[tokio::test]
async fn test_quotes_batch_keeps_order_and_errors() {
    let quotes = Arc::new(MockQuoteSource::new().with_quote("AAPL", apple()));
    let service = ServiceFactory::assemble(
        &config(&["AAPL"]),
        quotes,
        Arc::new(MockTimeSeriesSource::new()),
        None,
    );

    let symbols = vec!["NOPE".to_string(), "AAPL".to_string(), "bad sym".to_string()];
    let outcomes = service.get_quotes(&symbols).await;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].0, "NOPE");
    assert!(matches!(outcomes[0].1, Err(MarketDataError::NotFound { .. })));
    assert!(outcomes[1].1.is_ok());
    assert!(matches!(outcomes[2].1, Err(MarketDataError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_fundamentals() {
    let quotes = Arc::new(MockQuoteSource::new().with_quote("AAPL", apple()));
    let service = ServiceFactory::assemble(
        &config(&["AAPL"]),
        quotes,
        Arc::new(MockTimeSeriesSource::new()),
        None,
    );

    let fundamentals = service.get_fundamentals("AAPL").await.unwrap();
    assert_eq!(fundamentals.pe_ratio, Some(29.4));
    assert_eq!(fundamentals.industry, "Consumer Electronics");
    assert_eq!(fundamentals.peg_ratio, None);

    let rows = fundamentals.display_rows();
    assert_eq!(rows[0].0, "Market Cap");
    assert!(rows.iter().any(|(label, value)| *label == "PEG Ratio" && value == "N/A"));
}

#[tokio::test]
async fn test_snapshot_uses_configured_default_top_n() {
    let service = ServiceFactory::create_service(&config(&["A", "B", "C", "D", "E"]), None).unwrap();

    let snapshot = service.get_snapshot(None).await.unwrap();
    assert_eq!(snapshot.gainers.len(), 2);
    assert_eq!(snapshot.losers.len(), 2);

    let wider = service.get_snapshot(Some(5)).await.unwrap();
    assert_eq!(wider.gainers.len(), 5);
    assert_eq!(wider.computed_at, snapshot.computed_at);
    assert_eq!(wider.top(2), snapshot);
}
