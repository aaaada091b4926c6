use crate::domain::market::quote::Quote;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ranked gainers/losers computed from one universe fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Descending by change percent
    pub gainers: Vec<Quote>,
    /// Ascending by change percent
    pub losers: Vec<Quote>,
    pub computed_at: DateTime<Utc>,
}

impl Snapshot {
    /// View limited to the first `n` gainers and losers, same timestamp.
    pub fn top(&self, n: usize) -> Snapshot {
        Snapshot {
            gainers: self.gainers.iter().take(n).cloned().collect(),
            losers: self.losers.iter().take(n).cloned().collect(),
            computed_at: self.computed_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty()
    }
}
