use crate::domain::market::{Quote, Snapshot};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::debug;

/// Sorts quotes by change percent and slices gainers and losers.
///
/// Quotes with an unknown or non-finite change percent are left out of both
/// lists. Equal change percents keep their input order (stable sort).
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker;

impl Ranker {
    /// Rank `quotes` and keep at most `n` entries on each side.
    pub fn rank(&self, quotes: &[Quote], n: usize, computed_at: DateTime<Utc>) -> Snapshot {
        let rankable: Vec<(f64, &Quote)> = quotes
            .iter()
            .filter_map(|q| q.change_percent.filter(|p| p.is_finite()).map(|p| (p, q)))
            .collect();

        let excluded = quotes.len() - rankable.len();
        if excluded > 0 {
            debug!(
                "Ranker: {} of {} quotes excluded (unknown change percent)",
                excluded,
                quotes.len()
            );
        }

        let mut descending = rankable.clone();
        descending.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut ascending = rankable;
        ascending.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        Snapshot {
            gainers: descending
                .into_iter()
                .take(n)
                .map(|(_, q)| q.clone())
                .collect(),
            losers: ascending
                .into_iter()
                .take(n)
                .map(|(_, q)| q.clone())
                .collect(),
            computed_at,
        }
    }

    /// Rank every quote; callers slice with [`Snapshot::top`].
    pub fn rank_all(&self, quotes: &[Quote], computed_at: DateTime<Utc>) -> Snapshot {
        self.rank(quotes, quotes.len(), computed_at)
    }
}
