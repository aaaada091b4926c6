use crate::domain::errors::{MarketDataError, MarketDataResult};
use std::collections::HashSet;

/// Longest ticker accepted before any upstream call is made.
pub const MAX_SYMBOL_LEN: usize = 15;

/// Normalize a user supplied ticker: trim, upper-case and validate.
///
/// Accepts letters, digits and the separators used by index and share-class
/// tickers (`.`, `-`, `^`, `=`). Anything else is rejected so that no request
/// is ever sent upstream for it.
pub fn normalize_symbol(raw: &str) -> MarketDataResult<String> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(MarketDataError::InvalidInput {
            symbol,
            reason: "symbol is empty".to_string(),
        });
    }

    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(MarketDataError::InvalidInput {
            reason: format!("longer than {} characters", MAX_SYMBOL_LEN),
            symbol,
        });
    }

    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(MarketDataError::InvalidInput {
            reason: format!("unsupported character '{}'", bad),
            symbol,
        });
    }

    Ok(symbol)
}

/// Split a comma separated symbol list as sent by clients (`"aapl, msft,,tsla"`).
///
/// Upper-cases, drops whitespace and empty entries, and keeps the first
/// occurrence of duplicates. Entries are not validated here.
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .map(|s| s.to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert_eq!(normalize_symbol("ZZZZINVALID").unwrap(), "ZZZZINVALID");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(
            normalize_symbol("   "),
            Err(MarketDataError::InvalidInput { .. })
        ));
        assert!(matches!(
            normalize_symbol("AA PL"),
            Err(MarketDataError::InvalidInput { .. })
        ));
        assert!(matches!(
            normalize_symbol("../etc"),
            Err(MarketDataError::InvalidInput { .. })
        ));
        assert!(matches!(
            normalize_symbol("ABCDEFGHIJKLMNOP"),
            Err(MarketDataError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_parse_symbol_list() {
        assert_eq!(
            parse_symbol_list("aapl, msft,,tsla , AAPL"),
            vec!["AAPL", "MSFT", "TSLA"]
        );
        assert!(parse_symbol_list("").is_empty());
        assert!(parse_symbol_list(" , ,").is_empty());
    }
}
