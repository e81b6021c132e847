//! CSV file price adapter.
//!
//! Reads a header row with a `date` column (`YYYY-MM-DD`) and an
//! `adj close` or `close` column, matched case-insensitively. Blank, `null`
//! and NaN closes are dropped. A directory path resolves to
//! `<dir>/<ticker>.csv`.

use crate::domain::error::DcaError;
use crate::domain::price::{PricePoint, normalize_series};
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", ticker))
        } else {
            self.path.clone()
        }
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

fn parse_close(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse monthly closes from CSV text.
pub fn parse_prices(content: &str, ticker: &str) -> Result<Vec<PricePoint>, DcaError> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| DcaError::unavailable(ticker, format!("CSV header error: {}", e)))?
        .clone();

    let date_col = find_column(&headers, &["date"])
        .ok_or_else(|| DcaError::unavailable(ticker, "missing date column"))?;
    let close_col = find_column(&headers, &["adj close", "adj_close", "close"])
        .ok_or_else(|| DcaError::unavailable(ticker, "missing close column"))?;

    let mut points = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result
            .map_err(|e| DcaError::unavailable(ticker, format!("CSV parse error: {}", e)))?;

        let date_str = record.get(date_col).unwrap_or("").trim();
        // tolerate a time suffix such as "2024-01-01 00:00:00+08:00"
        let date_part = date_str.get(..10).unwrap_or(date_str);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
            DcaError::unavailable(
                ticker,
                format!("invalid date {:?} on row {}: {}", date_str, line + 2, e),
            )
        })?;

        match record.get(close_col).and_then(parse_close) {
            Some(price) => points.push(PricePoint::new(date, price)),
            None => tracing::debug!(%date, "dropping row without close"),
        }
    }

    Ok(normalize_series(points))
}

/// Write a series as `date,close` CSV, readable by [`CsvAdapter`].
pub fn write_prices(points: &[PricePoint], path: &Path) -> Result<(), DcaError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_io_error)?;
    wtr.write_record(["date", "close"]).map_err(csv_io_error)?;
    for point in points {
        wtr.write_record([point.date.format("%Y-%m-%d").to_string(), point.price.to_string()])
            .map_err(csv_io_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn csv_io_error(e: csv::Error) -> DcaError {
    DcaError::Io(std::io::Error::other(e))
}

impl PriceSource for CsvAdapter {
    fn fetch_monthly(&self, ticker: &str) -> Result<Vec<PricePoint>, DcaError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            DcaError::unavailable(ticker, format!("failed to read {}: {}", path.display(), e))
        })?;

        let points = parse_prices(&content, ticker)?;
        if points.is_empty() {
            return Err(DcaError::unavailable(
                ticker,
                format!("{} contains no prices", path.display()),
            ));
        }
        tracing::debug!(path = %path.display(), rows = points.len(), "loaded CSV prices");
        Ok(points)
    }
}
