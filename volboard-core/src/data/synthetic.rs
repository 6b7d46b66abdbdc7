//! Synthetic bar repository for offline runs and tests.
//!
//! Produces a deterministic random walk seeded from the symbol name, so the
//! same symbol and range always yield the same bars. The walk always starts at
//! [`WALK_EPOCH`] and requests are slices of it, so daily, weekly and quote
//! figures for one symbol describe the same price path. These are clearly
//! fake; the CLI labels any report built from them.

use super::provider::{aggregate_weekly, non_empty_series, BarRepository, DataError};
use crate::domain::{Bar, BarSeries, Granularity, Quote};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First day of every synthetic walk. Earlier dates have no bars.
pub const WALK_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 3) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Deterministic random-walk repository.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    /// Date the "latest quote" is stamped with.
    today: NaiveDate,
}

impl SyntheticProvider {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            start_price: 100.0,
            today,
        }
    }

    fn rng_for(symbol: &str, salt: &str) -> StdRng {
        let seed = blake3::hash(format!("{symbol}:{salt}").as_bytes());
        StdRng::from_seed(*seed.as_bytes())
    }

    /// Weekday bars from `start` through `end`, inclusive.
    pub fn daily_bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let mut rng = Self::rng_for(symbol, "daily");
        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = WALK_EPOCH;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.015));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.015));
            let volume = rng.gen_range(500_000..5_000_000u64);

            if current >= start {
                bars.push(Bar {
                    timestamp: current.and_time(NaiveTime::MIN),
                    open,
                    high,
                    low,
                    close,
                    volume: Some(volume),
                });
            }

            price = close;
            current += Duration::days(1);
        }

        bars
    }

    /// One-minute bars for the regular session on `date`, opening at `open_price`.
    fn minute_bars(&self, symbol: &str, date: NaiveDate, open_price: f64) -> Vec<Bar> {
        let mut rng = Self::rng_for(symbol, &format!("minute:{date}"));
        let bell = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN);
        let session_open = date.and_time(bell);
        let mut price = open_price;

        (0..390)
            .map(|i| {
                let step: f64 = rng.gen_range(-0.001..0.001);
                let open = price;
                let close = price * (1.0 + step);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.0005));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.0005));
                price = close;
                Bar {
                    timestamp: session_open + Duration::minutes(i),
                    open,
                    high,
                    low,
                    close,
                    volume: Some(rng.gen_range(1_000..20_000u64)),
                }
            })
            .collect()
    }
}

impl BarRepository for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        let bars = match granularity {
            Granularity::Daily => self.daily_bars(symbol, start, end),
            Granularity::Weekly => aggregate_weekly(&self.daily_bars(symbol, start, end)),
            Granularity::IntradayMinute => {
                // Today's session opens where the daily walk does: today's open,
                // or the last close before a weekend.
                let session_open = self
                    .daily_bars(symbol, self.today - Duration::days(7), self.today)
                    .last()
                    .map(|b| if b.date() == self.today { b.open } else { b.close })
                    .unwrap_or(self.start_price);
                self.minute_bars(symbol, self.today, session_open)
            }
        };
        non_empty_series(symbol, granularity, bars)
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let series = self.fetch_bars(symbol, Granularity::IntradayMinute, self.today, self.today)?;
        let last = series.last().ok_or_else(|| DataError::NoData {
            symbol: symbol.to_string(),
            granularity: Granularity::IntradayMinute,
        })?;
        Ok(Quote {
            symbol: symbol.to_string(),
            price: last.close,
            as_of: last.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_bars_are_deterministic_and_sane() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let a = provider
            .fetch_daily("AAPL", date(2024, 1, 1), date(2024, 3, 31))
            .unwrap();
        let b = provider
            .fetch_daily("AAPL", date(2024, 1, 1), date(2024, 3, 31))
            .unwrap();
        assert_eq!(a, b);
        assert!(a.bars().iter().all(Bar::is_sane));
        assert!(a
            .bars()
            .iter()
            .all(|bar| !matches!(bar.date().weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn different_symbols_differ() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let a = provider.daily_bars("AAPL", date(2024, 1, 1), date(2024, 1, 31));
        let b = provider.daily_bars("MSFT", date(2024, 1, 1), date(2024, 1, 31));
        assert_ne!(a, b);
    }

    #[test]
    fn overlapping_ranges_share_one_price_path() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let long = provider
            .fetch_daily("AAPL", date(2019, 7, 25), date(2024, 6, 28))
            .unwrap();
        let short = provider
            .fetch_daily("AAPL", date(2022, 1, 10), date(2024, 6, 28))
            .unwrap();
        assert_eq!(short, long.slice_dates(date(2022, 1, 10), date(2024, 6, 28)));

        let weekly = provider
            .fetch_weekly("AAPL", date(2022, 1, 10), date(2024, 6, 28))
            .unwrap();
        assert_eq!(weekly.bars(), aggregate_weekly(short.bars()).as_slice());
    }

    #[test]
    fn quote_session_opens_at_todays_daily_open() {
        let today = date(2024, 6, 28);
        let provider = SyntheticProvider::new(today);
        let daily = provider.fetch_daily("AAPL", today, today).unwrap();
        let minutes = provider
            .fetch_bars("AAPL", Granularity::IntradayMinute, today, today)
            .unwrap();
        assert_eq!(minutes.bars()[0].open, daily.bars()[0].open);
    }

    #[test]
    fn dates_before_walk_epoch_have_no_bars() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let bars = provider.daily_bars("AAPL", date(1999, 12, 1), date(2000, 1, 7));
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[0].date(), WALK_EPOCH);
    }

    #[test]
    fn weekly_bars_cover_daily_extremes() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let daily = provider.daily_bars("AAPL", date(2024, 1, 1), date(2024, 2, 29));
        let weekly = aggregate_weekly(&daily);
        assert_eq!(weekly.len(), 9);
        assert_eq!(weekly[0].date().weekday(), Weekday::Mon);

        let first_week: Vec<&Bar> = daily.iter().take(5).collect();
        let max_high = first_week.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let min_low = first_week.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        assert_eq!(weekly[0].high, max_high);
        assert_eq!(weekly[0].low, min_low);
        assert_eq!(weekly[0].close, first_week[4].close);
    }

    #[test]
    fn empty_range_is_no_data() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        // Saturday to Sunday: no weekday bars
        let err = provider
            .fetch_daily("AAPL", date(2024, 6, 29), date(2024, 6, 30))
            .unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn quote_is_last_minute_close() {
        let provider = SyntheticProvider::new(date(2024, 6, 28));
        let quote = provider.fetch_latest_quote("AAPL").unwrap();
        assert_eq!(quote.as_of.date(), date(2024, 6, 28));
        assert_eq!(quote.as_of.format("%H:%M").to_string(), "15:59");
        assert!(quote.price > 0.0);
    }
}
