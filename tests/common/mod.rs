#![allow(dead_code)]

use chrono::{Months, NaiveDate};
use dcasim::domain::error::DcaError;
pub use dcasim::domain::price::PricePoint;
use dcasim::domain::params::StrategyParams;
use dcasim::ports::price_port::PriceSource;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_prices(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_monthly(&self, ticker: &str) -> Result<Vec<PricePoint>, DcaError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DcaError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monthly points on the first of each month starting at `start`.
pub fn monthly_points(start: NaiveDate, prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: start.checked_add_months(Months::new(i as u32)).unwrap(),
            price,
        })
        .collect()
}

/// A trending series with a seasonal wiggle and one sharp sell-off, so both
/// indicators vary month to month.
pub fn generate_prices(count: usize, start_price: f64) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let trend = start_price * (1.0 + 0.006 * t);
            let wiggle = 0.06 * start_price * (t * 0.7).sin();
            let crash = if (40..52).contains(&i) { 0.7 } else { 1.0 };
            (trend + wiggle) * crash
        })
        .collect()
}

pub fn test_params() -> StrategyParams {
    StrategyParams {
        ticker: "0050.TW".into(),
        monthly_invest: 1000.0,
        start_year: 2004,
        momentum_period: 6,
        volatility_period: 3,
        cash_rate: 0.02,
    }
}
