//! CSV candle import.
//!
//! Files carry a header row `timestamp,open,high,low,close,volume`, one candle
//! per row, oldest first. `CsvProvider` serves a directory of such files named
//! `{SYMBOL}_{interval}.csv` so a scan can run offline.

use std::path::{Path, PathBuf};

use dmatd_core::Candle;
use serde::Deserialize;

use super::provider::{DataError, DataSource, FetchResult, Interval, KlineProvider};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: Option<i64>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl CsvRow {
    fn into_candle(self, line: u64) -> Result<Candle, DataError> {
        let missing = |name: &str| DataError::Validation(format!("line {line}: missing {name}"));
        let candle = Candle {
            timestamp: self.timestamp.ok_or_else(|| missing("timestamp"))?,
            open: self.open.ok_or_else(|| missing("open"))?,
            high: self.high.ok_or_else(|| missing("high"))?,
            low: self.low.ok_or_else(|| missing("low"))?,
            close: self.close.ok_or_else(|| missing("close"))?,
            volume: self.volume.ok_or_else(|| missing("volume"))?,
        };
        candle
            .validate()
            .map_err(|e| DataError::Validation(format!("line {line}: {e}")))?;
        Ok(candle)
    }
}

/// Read every candle from a CSV file.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut candles = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let row = record.map_err(|e| csv_error(path, e))?;
        let line = candles.len() as u64 + 2;
        candles.push(row.into_candle(line)?);
    }
    Ok(candles)
}

fn csv_error(path: &Path, err: csv::Error) -> DataError {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return DataError::Io(io);
        }
        return DataError::Other(format!("{}: unreadable", path.display()));
    }
    DataError::Validation(format!("{}: {err}", path.display()))
}

/// Provider backed by a directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir.join(format!("{symbol}_{interval}.csv"))
    }
}

impl KlineProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Err(DataError::NoLocalData {
                symbol: symbol.to_string(),
                path: path.display().to_string(),
            });
        }

        let mut candles = read_candles(&path)?;
        // Keep the most recent `limit`, like the exchange endpoint.
        let skip = candles.len().saturating_sub(limit);
        candles.drain(..skip);

        Ok(FetchResult {
            symbol: symbol.to_string(),
            interval,
            candles,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const GOOD: &str = "timestamp,open,high,low,close,volume\n\
                        1700000000,100,101,99,100.5,10\n\
                        1700014400,100.5,102,100,101.5,12\n\
                        1700028800,101.5,103,101,102.5,9\n";

    #[test]
    fn reads_well_formed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "BTCUSDT_4h.csv", GOOD);
        let candles = read_candles(&path).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].timestamp, 1_700_000_000);
        assert_eq!(candles[2].close, 102.5);
    }

    #[test]
    fn empty_cell_names_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "x.csv",
            "timestamp,open,high,low,close,volume\n1,1,1,1,1,1\n2,1,1,1,,1\n",
        );
        let err = read_candles(&path).unwrap_err();
        assert!(matches!(err, DataError::Validation(msg) if msg == "line 3: missing close"));
    }

    #[test]
    fn non_numeric_cell_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "x.csv",
            "timestamp,open,high,low,close,volume\n1,1,one,1,1,1\n",
        );
        assert!(matches!(read_candles(&path), Err(DataError::Validation(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_candles(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }

    #[test]
    fn provider_keeps_most_recent_limit() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "BTCUSDT_4h.csv", GOOD);
        let provider = CsvProvider::new(dir.path());

        let result = provider.fetch("BTCUSDT", Interval::FourHours, 2).unwrap();
        assert_eq!(result.source, DataSource::CsvImport);
        assert_eq!(result.candles.len(), 2);
        assert_eq!(result.candles[0].timestamp, 1_700_014_400);
    }

    #[test]
    fn provider_reports_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        assert!(provider.is_available());
        let err = provider.fetch("ETHUSDT", Interval::OneDay, 10).unwrap_err();
        assert!(matches!(err, DataError::NoLocalData { symbol, .. } if symbol == "ETHUSDT"));
    }
}
