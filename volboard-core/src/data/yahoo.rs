//! Yahoo Finance bar repository.
//!
//! Fetches daily, weekly, and one-minute bars from Yahoo's v8 chart API.
//! Handles rate limiting, retries with exponential backoff, response parsing,
//! and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{aggregate_weekly, canonicalize, non_empty_series, BarRepository, DataError};
use crate::domain::{Bar, BarSeries, Granularity, Quote};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Parsed chart payload: bars plus the exchange metadata we care about.
#[derive(Debug)]
struct ParsedChart {
    bars: Vec<Bar>,
    gmtoffset: i64,
    market_price: Option<f64>,
    market_time: Option<i64>,
}

/// Yahoo Finance bar repository.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    fn interval(granularity: Granularity) -> &'static str {
        match granularity {
            Granularity::Daily => "1d",
            Granularity::Weekly => "1wk",
            Granularity::IntradayMinute => "1m",
        }
    }

    /// Build the chart API URL for a symbol, granularity, and date range.
    fn chart_url(
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_399;
        format!(
            "{BASE_URL}/{symbol}?period1={start_ts}&period2={end_ts}&interval={}",
            Self::interval(granularity)
        )
    }

    /// URL for today's one-minute bars, used to read the latest traded price.
    fn intraday_url(symbol: &str) -> String {
        format!("{BASE_URL}/{symbol}?range=1d&interval=1m")
    }

    /// Parse the chart API response into bars stamped in exchange-local time.
    ///
    /// Daily and weekly bars are normalised to local midnight. Rows with all
    /// prices missing (holidays) are skipped silently; rows with some prices
    /// missing, or prices that violate OHLC ordering, are dropped with a warning.
    ///
    /// While the market is open, a `1wk` response carries an extra row stamped
    /// with the current day after the in-progress week's Monday row. Weekly
    /// rows are merged per ISO week so each week appears once.
    fn parse_response(
        symbol: &str,
        granularity: Granularity,
        resp: ChartResponse,
    ) -> Result<ParsedChart, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let gmtoffset = data.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
        let market_price = data.meta.as_ref().and_then(|m| m.regular_market_price);
        let market_time = data.meta.as_ref().and_then(|m| m.regular_market_time);

        // A symbol with no trades in range comes back without a timestamp array.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut dropped = 0usize;

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = local_timestamp(ts, gmtoffset, granularity)?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            let (open, high, low, close) = match (open, high, low, close) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                (None, None, None, None) => continue,
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            let bar = Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            };
            if !bar.is_sane() {
                dropped += 1;
                continue;
            }
            bars.push(bar);
        }

        if dropped > 0 {
            tracing::warn!(
                symbol,
                %granularity,
                dropped,
                "dropped incomplete or inconsistent rows"
            );
        }

        let mut bars = canonicalize(bars);
        if granularity == Granularity::Weekly {
            bars = aggregate_weekly(&bars);
        }

        Ok(ParsedChart {
            bars,
            gmtoffset,
            market_price,
            market_time,
        })
    }

    /// Execute a single HTTP request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        granularity: Granularity,
        url: &str,
    ) -> Result<ParsedChart, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, "retrying chart request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(DataError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    let parsed = Self::parse_response(symbol, granularity, chart)?;
                    self.circuit_breaker.record_success();
                    return Ok(parsed);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

/// Convert a UTC epoch second into exchange-local time at the granularity's resolution.
fn local_timestamp(
    ts: i64,
    gmtoffset: i64,
    granularity: Granularity,
) -> Result<NaiveDateTime, DataError> {
    let local = chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;
    Ok(match granularity {
        Granularity::Daily | Granularity::Weekly => local.date().and_time(NaiveTime::MIN),
        Granularity::IntradayMinute => local,
    })
}

impl BarRepository for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BarSeries, DataError> {
        let url = match granularity {
            Granularity::IntradayMinute => Self::intraday_url(symbol),
            _ => Self::chart_url(symbol, granularity, start, end),
        };
        tracing::info!(symbol, %granularity, %start, %end, "fetching bars from Yahoo Finance");
        let parsed = self.fetch_with_retry(symbol, granularity, &url)?;
        non_empty_series(symbol, granularity, parsed.bars)
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let url = Self::intraday_url(symbol);
        let parsed = self.fetch_with_retry(symbol, Granularity::IntradayMinute, &url)?;

        if let Some(last) = parsed.bars.last() {
            return Ok(Quote {
                symbol: symbol.to_string(),
                price: last.close,
                as_of: last.timestamp,
            });
        }

        // Pre-market: no minute bars yet, fall back to the last regular-session print.
        match (parsed.market_price, parsed.market_time) {
            (Some(price), Some(time)) => Ok(Quote {
                symbol: symbol.to_string(),
                price,
                as_of: local_timestamp(time, parsed.gmtoffset, Granularity::IntradayMinute)?,
            }),
            _ => Err(DataError::NoData {
                symbol: symbol.to_string(),
                granularity: Granularity::IntradayMinute,
            }),
        }
    }
}
