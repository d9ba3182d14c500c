//! Binance USDⓈ-M futures kline provider.
//!
//! Fetches the most recent klines from `/fapi/v1/klines`. Handles rate
//! limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker. Market data endpoints need no API key.

use std::sync::Arc;
use std::time::Duration;

use dmatd_core::Candle;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, FetchResult, Interval, KlineProvider};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_KLINE_LIMIT: usize = 1500;

/// Binance error code for an unknown symbol.
const INVALID_SYMBOL: i64 = -1121;

/// Error body returned alongside 4xx statuses.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

/// Binance USDⓈ-M futures provider.
pub struct BinanceFuturesProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl BinanceFuturesProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL, circuit_breaker)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dmatd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Build the klines URL for a symbol, clamping `limit` to what the API accepts.
    fn klines_url(&self, symbol: &str, interval: Interval, limit: usize) -> String {
        let limit = limit.clamp(1, MAX_KLINE_LIMIT);
        format!(
            "{}/fapi/v1/klines?symbol={symbol}&interval={interval}&limit={limit}",
            self.base_url
        )
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.klines_url(symbol, interval, limit);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                if let Some(err) = &last_error {
                    warn!(symbol, attempt, error = %err, ?delay, "kline request failed, retrying");
                }
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            debug!(%url, "requesting klines");
            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::IM_A_TEAPOT {
                // IP auto-ban
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
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

            let body = resp
                .text()
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

            if status.is_client_error() {
                return Err(Self::client_error(symbol, status, &body));
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let rows: Vec<Vec<Value>> = serde_json::from_str(&body).map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse klines for {symbol}: {e}"
                ))
            })?;

            let candles = parse_klines(&rows)?;
            self.circuit_breaker.record_success();
            return Ok(candles);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    fn client_error(symbol: &str, status: reqwest::StatusCode, body: &str) -> DataError {
        match serde_json::from_str::<ApiError>(body) {
            Ok(err) if err.code == INVALID_SYMBOL => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Ok(err) => DataError::Other(format!("HTTP {status} ({}): {}", err.code, err.msg)),
            Err(_) => DataError::Other(format!("HTTP {status} for {symbol}")),
        }
    }
}

/// Parse kline rows `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
///
/// Any malformed row fails the whole batch.
pub fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Candle>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_kline(i, row))
        .collect()
}

fn parse_kline(index: usize, row: &[Value]) -> Result<Candle, DataError> {
    let open_time_ms = row
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| DataError::Validation(format!("kline {index}: missing open time")))?;

    let candle = Candle {
        timestamp: open_time_ms / 1000,
        open: numeric_field(index, row, 1, "open")?,
        high: numeric_field(index, row, 2, "high")?,
        low: numeric_field(index, row, 3, "low")?,
        close: numeric_field(index, row, 4, "close")?,
        volume: numeric_field(index, row, 5, "volume")?,
    };
    candle
        .validate()
        .map_err(|e| DataError::Validation(format!("kline {index}: {e}")))?;
    Ok(candle)
}

fn numeric_field(index: usize, row: &[Value], pos: usize, name: &str) -> Result<f64, DataError> {
    let value = row
        .get(pos)
        .ok_or_else(|| DataError::Validation(format!("kline {index}: missing {name}")))?;
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| DataError::Validation(format!("kline {index}: {name} is not numeric ({value})")))
}

impl KlineProvider for BinanceFuturesProvider {
    fn name(&self) -> &str {
        "binance_futures"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<FetchResult, DataError> {
        let candles = self.fetch_with_retry(symbol, interval, limit)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            interval,
            candles,
            source: DataSource::BinanceFutures,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Vec<Value>> {
        serde_json::from_value(value).unwrap()
    }

    fn provider() -> BinanceFuturesProvider {
        BinanceFuturesProvider::with_base_url(
            "https://example.invalid/",
            Arc::new(CircuitBreaker::default_provider()),
        )
        .unwrap()
    }

    #[test]
    fn parses_string_fields_and_truncates_millis() {
        let klines = rows(json!([
            [1_700_000_000_999i64, "100.5", "101.0", "99.0", "100.8", "1234.5", 1_700_014_399_999i64, "0", 10, "0", "0", "0"],
            [1_700_014_400_000i64, "100.8", "102.0", "100.1", "101.9", "999", 1_700_028_799_999i64, "0", 8, "0", "0", "0"]
        ]));
        let candles = parse_klines(&klines).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_000_000);
        assert_eq!(candles[0].open, 100.5);
        assert_eq!(candles[0].volume, 1234.5);
        assert_eq!(candles[1].timestamp, 1_700_014_400);
        assert_eq!(candles[1].close, 101.9);
    }

    #[test]
    fn accepts_numeric_fields() {
        let klines = rows(json!([[1_000i64, 1.0, 2.0, 0.5, 1.5, 10]]));
        let candles = parse_klines(&klines).unwrap();
        assert_eq!(candles[0].timestamp, 1);
        assert_eq!(candles[0].volume, 10.0);
    }

    #[test]
    fn short_row_is_a_validation_error() {
        let klines = rows(json!([[1_000i64, "1", "2", "0.5", "1.5"]]));
        let err = parse_klines(&klines).unwrap_err();
        assert!(matches!(err, DataError::Validation(msg) if msg.contains("missing volume")));
    }

    #[test]
    fn non_numeric_field_fails_the_batch() {
        let klines = rows(json!([
            [1_000i64, "1", "2", "0.5", "1.5", "3"],
            [2_000i64, "1", "abc", "0.5", "1.5", "3"]
        ]));
        let err = parse_klines(&klines).unwrap_err();
        assert!(matches!(err, DataError::Validation(msg) if msg.starts_with("kline 1: high")));
    }

    #[test]
    fn missing_open_time_is_rejected() {
        let klines = rows(json!([["x", "1", "2", "0.5", "1.5", "3"]]));
        assert!(matches!(parse_klines(&klines), Err(DataError::Validation(_))));
    }

    #[test]
    fn empty_response_is_empty() {
        assert!(parse_klines(&[]).unwrap().is_empty());
    }

    #[test]
    fn url_clamps_limit_and_strips_trailing_slash() {
        let p = provider();
        assert_eq!(
            p.klines_url("BTCUSDT", Interval::FourHours, 100),
            "https://example.invalid/fapi/v1/klines?symbol=BTCUSDT&interval=4h&limit=100"
        );
        assert!(p
            .klines_url("BTCUSDT", Interval::OneDay, 5_000)
            .ends_with("limit=1500"));
        assert!(p.klines_url("BTCUSDT", Interval::OneDay, 0).ends_with("limit=1"));
    }

    #[test]
    fn invalid_symbol_maps_to_not_found() {
        let err = BinanceFuturesProvider::client_error(
            "NOPEUSDT",
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"code":-1121,"msg":"Invalid symbol."}"#,
        );
        assert!(matches!(err, DataError::SymbolNotFound { symbol } if symbol == "NOPEUSDT"));
    }

    #[test]
    fn other_client_errors_keep_the_message() {
        let err = BinanceFuturesProvider::client_error(
            "BTCUSDT",
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"code":-1120,"msg":"Invalid interval."}"#,
        );
        assert!(err.to_string().contains("Invalid interval."));
    }

    #[test]
    fn tripped_breaker_refuses_without_network() {
        let cb = Arc::new(CircuitBreaker::default_provider());
        cb.trip();
        let p = BinanceFuturesProvider::with_base_url("https://example.invalid", cb).unwrap();
        assert!(!p.is_available());
        assert!(matches!(
            p.fetch("BTCUSDT", Interval::FourHours, 10),
            Err(DataError::CircuitBreakerTripped)
        ));
    }

    proptest::proptest! {
        #[test]
        fn parsed_klines_keep_prices_and_second_resolution(
            open_ms in 0i64..4_000_000_000_000,
            close in 0.0001f64..1_000_000.0,
        ) {
            let klines = rows(json!([
                [open_ms, close.to_string(), close.to_string(), close.to_string(), close.to_string(), "1", open_ms + 1, "0", 1, "0", "0", "0"],
            ]));
            let candles = parse_klines(&klines).unwrap();
            proptest::prop_assert_eq!(candles[0].timestamp, open_ms / 1000);
            proptest::prop_assert_eq!(candles[0].close, close);
        }
    }
}
