//! Yahoo Finance chart API price adapter.
//!
//! Requests the whole monthly history (`range=max&interval=1mo`) with a
//! bounded timeout. Transport failures, 429 and 5xx responses are retried
//! after a short back-off; other failures are final.

use std::thread;
use std::time::Duration;

use chrono::DateTime;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::error::DcaError;
use crate::domain::price::{PricePoint, normalize_series};
use crate::ports::price_port::PriceSource;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts after the first one
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retries: 1,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Why a single request attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure {
    Transient(String),
    Permanent(String),
}

impl FetchFailure {
    fn reason(self) -> String {
        match self {
            FetchFailure::Transient(r) | FetchFailure::Permanent(r) => r,
        }
    }
}

/// Run `op` once, then up to `retries` more times while it fails transiently.
pub fn with_retry<T, F>(retries: u32, backoff: Duration, mut op: F) -> Result<T, FetchFailure>
where
    F: FnMut(u32) -> Result<T, FetchFailure>,
{
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(FetchFailure::Transient(reason)) if attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    retries,
                    "price request failed ({reason}), retrying in {:?}",
                    backoff
                );
                thread::sleep(backoff);
            }
            Err(failure) => return Err(failure),
        }
    }
}

/// Parse a chart API body into monthly closes. Adjusted closes are used for
/// the whole series when the response carries them, raw closes otherwise.
pub fn parse_chart(body: &str, ticker: &str) -> Result<Vec<PricePoint>, DcaError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| DcaError::unavailable(ticker, format!("malformed chart response: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(DcaError::unavailable(
            ticker,
            format!("{}: {}", error.code, error.description),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DcaError::unavailable(ticker, "no chart result"))?;

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();
    // one price basis for the whole series: adjusted when the response has it
    let prices = result
        .indicators
        .adjclose
        .and_then(|ac| ac.into_iter().next())
        .and_then(|ac| ac.adjclose)
        .unwrap_or(closes);

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(price) = prices.get(i).copied().flatten() else {
            continue;
        };
        let moment = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| {
                DcaError::unavailable(ticker, format!("timestamp {} out of range", ts))
            })?;
        points.push(PricePoint::new(moment.date_naive(), price));
    }

    let points = normalize_series(points);
    if points.is_empty() {
        return Err(DcaError::unavailable(ticker, "chart result contains no closes"));
    }
    Ok(points)
}

pub struct YahooAdapter {
    config: YahooConfig,
    http: Client,
}

impl YahooAdapter {
    pub fn with_config(config: YahooConfig) -> Result<Self, DcaError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DcaError::Io(std::io::Error::other(e)))?;
        Ok(Self { config, http })
    }

    pub fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/{}?range=max&interval=1mo&events=history",
            self.config.base_url.trim_end_matches('/'),
            ticker
        )
    }

    fn request_once(&self, url: &str) -> Result<String, FetchFailure> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| FetchFailure::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FetchFailure::Transient(format!("failed to read body: {}", e)))?;

        if status.is_success() {
            return Ok(body);
        }
        let reason = format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>());
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(FetchFailure::Transient(reason))
        } else {
            Err(FetchFailure::Permanent(reason))
        }
    }
}

impl PriceSource for YahooAdapter {
    fn fetch_monthly(&self, ticker: &str) -> Result<Vec<PricePoint>, DcaError> {
        let url = self.chart_url(ticker);
        let body = with_retry(self.config.retries, self.config.retry_backoff, |attempt| {
            tracing::debug!(%url, attempt, "requesting chart");
            self.request_once(&url)
        })
        .map_err(|failure| DcaError::unavailable(ticker, failure.reason()))?;

        let points = parse_chart(&body, ticker)?;
        tracing::info!(ticker, months = points.len(), "fetched monthly prices");
        Ok(points)
    }
}
