use crate::config::{Config, DEFAULT_UNIVERSE, Mode};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: [&str; 17] = [
    "MODE",
    "YAHOO_BASE_URL",
    "YAHOO_USER_AGENT",
    "ALPHA_VANTAGE_URL",
    "ALPHA_VANTAGE_API_KEY",
    "UPSTREAM_TIMEOUT_SECS",
    "UPSTREAM_MAX_RETRIES",
    "SNAPSHOT_TTL_SECS",
    "SNAPSHOT_TOP_N",
    "UNIVERSE",
    "FETCH_CONCURRENCY",
    "HISTORY_LENGTH",
    "HISTORY_LOOKBACK_DAYS",
    "SYNTHETIC_BASE_PRICE",
    "SYNTHETIC_SEED",
    "METRICS_ENABLED",
    "RUST_LOG",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: callers hold ENV_LOCK, so no other test thread touches the environment
        unsafe { env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    // SAFETY: callers hold ENV_LOCK
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_defaults() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.mode, Mode::Live);
    assert_eq!(config.providers.alpha_vantage.api_key, "demo");
    assert_eq!(config.providers.timeout, Duration::from_secs(10));
    assert_eq!(config.providers.max_retries, 2);
    assert_eq!(config.snapshot.ttl, Duration::from_secs(300));
    assert_eq!(config.snapshot.top_n, 20);
    assert_eq!(config.snapshot.universe.len(), DEFAULT_UNIVERSE.len());
    assert_eq!(config.snapshot.universe[0], "AAPL");
    assert_eq!(config.snapshot.fetch_concurrency, 8);
    assert_eq!(config.history.length, 126);
    assert_eq!(config.history.lookback_days, 180);
    assert_eq!(config.history.synthetic_seed, None);
    assert!(config.observability.metrics_enabled);
}

#[test]
fn test_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("MODE", "Mock");
    set("UNIVERSE", "msft, aapl,,MSFT");
    set("SNAPSHOT_TTL_SECS", "60");
    set("SYNTHETIC_SEED", "42");
    set("METRICS_ENABLED", "false");

    let config = Config::from_env().unwrap();
    assert_eq!(config.mode, Mode::Mock);
    assert_eq!(config.snapshot.universe, vec!["MSFT", "AAPL"]);
    assert_eq!(config.snapshot.ttl, Duration::from_secs(60));
    assert_eq!(config.history.synthetic_seed, Some(42));
    assert!(!config.observability.metrics_enabled);

    clear_env();
}

#[test]
fn test_invalid_number_is_error() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("SNAPSHOT_TOP_N", "twenty");

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("SNAPSHOT_TOP_N"));

    clear_env();
}

#[test]
fn test_invalid_mode_is_error() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("MODE", "paper");
    assert!(Config::from_env().is_err());
    clear_env();
}

#[test]
fn test_zero_concurrency_rejected() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("FETCH_CONCURRENCY", "0");
    assert!(Config::from_env().is_err());
    clear_env();
}

#[test]
fn test_history_generator_follows_config() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("SYNTHETIC_BASE_PRICE", "42.5");
    set("HISTORY_LOOKBACK_DAYS", "200");

    let config = Config::from_env().unwrap();
    let generator = config.history.generator();
    assert_eq!(generator.base_price, 42.5);
    assert_eq!(generator.lookback_days, 200);
    assert_eq!(generator.length, 126);

    clear_env();
}
