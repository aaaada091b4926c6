use crate::domain::errors::{MarketDataError, MarketDataResult};
use crate::domain::market::history::is_trading_day;
use crate::domain::market::{HistoricalPoint, SERIES_LENGTH};
use chrono::{Days, NaiveDate};
use rand::Rng;

/// Random-walk generator for stand-in daily series.
///
/// Each trading day applies a uniform return in `[-max_daily_return,
/// +max_daily_return]` to the previous base price (floored at `min_price`),
/// draws a high/low band of `band_pct` around it and picks open and close
/// uniformly inside the band.
#[derive(Debug, Clone)]
pub struct SyntheticSeriesGenerator {
    pub base_price: f64,
    pub length: usize,
    pub lookback_days: u64,
    pub max_daily_return: f64,
    pub band_pct: f64,
    pub min_price: f64,
    pub min_volume: u64,
    pub max_volume: u64,
}

impl Default for SyntheticSeriesGenerator {
    fn default() -> Self {
        Self {
            base_price: 150.0,
            length: SERIES_LENGTH,
            lookback_days: 180,
            max_daily_return: 0.05,
            band_pct: 0.02,
            min_price: 10.0,
            min_volume: 500_000,
            max_volume: 5_000_000,
        }
    }
}

impl SyntheticSeriesGenerator {
    /// Generate `length` trading-day points starting `lookback_days` before `today`.
    ///
    /// Fails only if the calendar runs out, which keeps the all-or-nothing
    /// contract: a partial series is never returned.
    pub fn generate<R: Rng>(
        &self,
        symbol: &str,
        today: NaiveDate,
        rng: &mut R,
    ) -> MarketDataResult<Vec<HistoricalPoint>> {
        let unavailable = |reason: &str| MarketDataError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        };

        if self.length == 0 {
            return Err(unavailable("synthetic series length is zero"));
        }

        let mut date = today
            .checked_sub_days(Days::new(self.lookback_days))
            .ok_or_else(|| unavailable("start date out of range"))?;
        let mut base = self.base_price.max(self.min_price);
        let mut points = Vec::with_capacity(self.length);

        for _ in 0..self.length {
            while !is_trading_day(date) {
                date = date
                    .succ_opt()
                    .ok_or_else(|| unavailable("calendar overflow"))?;
            }

            let daily_return = rng.random_range(-self.max_daily_return..=self.max_daily_return);
            base = (base * (1.0 + daily_return)).max(self.min_price);

            let band = base * self.band_pct;
            let high = base + rng.random_range(0.0..=band);
            let low = (base - rng.random_range(0.0..=band)).max(self.min_price);
            let open = rng.random_range(low..=high);
            let close = rng.random_range(low..=high);
            let volume = rng.random_range(self.min_volume..=self.max_volume);

            points.push(HistoricalPoint {
                date,
                open: round_cents(open),
                high: round_cents(high),
                low: round_cents(low),
                close: round_cents(close),
                volume,
            });

            date = date
                .succ_opt()
                .ok_or_else(|| unavailable("calendar overflow"))?;
        }

        Ok(points)
    }
}

// Rounding is monotonic, so low <= open/close <= high survives it
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{HistoricalSeries, SeriesProvenance};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    #[test]
    fn test_shape_and_bounds() {
        let generator = SyntheticSeriesGenerator::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points = generator.generate("TEST", today(), &mut rng).unwrap();
            assert_eq!(points.len(), 126);

            let series = HistoricalSeries {
                symbol: "TEST".into(),
                points,
                provenance: SeriesProvenance::Synthetic {
                    reason: "test".into(),
                },
            };
            assert!(series.is_well_formed(), "seed {} produced a bad series", seed);

            for p in &series.points {
                assert!(p.low <= p.open && p.open <= p.high);
                assert!(p.low <= p.close && p.close <= p.high);
                assert!(p.close >= 10.0);
                assert!((500_000..=5_000_000).contains(&p.volume));
            }
        }
    }

    #[test]
    fn test_starts_lookback_days_before_today() {
        let generator = SyntheticSeriesGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let points = generator.generate("TEST", today(), &mut rng).unwrap();

        let start = today().checked_sub_days(Days::new(180)).unwrap();
        assert!(points[0].date >= start);
        assert!((points[0].date - start).num_days() <= 2);
        assert!(points.last().unwrap().date <= today());
    }

    #[test]
    fn test_same_seed_same_series() {
        let generator = SyntheticSeriesGenerator::default();
        let a = generator
            .generate("TEST", today(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = generator
            .generate("TEST", today(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_price_floor_holds_in_crash() {
        // A walk starting just above the floor must never breach it
        let generator = SyntheticSeriesGenerator {
            base_price: 10.5,
            max_daily_return: 0.05,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let points = generator.generate("PENNY", today(), &mut rng).unwrap();
        assert!(points.iter().all(|p| p.low >= 10.0 && p.close >= 10.0));
    }

    #[test]
    fn test_zero_length_is_unavailable() {
        let generator = SyntheticSeriesGenerator {
            length: 0,
            ..Default::default()
        };
        let result = generator.generate("TEST", today(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(MarketDataError::DataUnavailable { .. })));
    }
}
