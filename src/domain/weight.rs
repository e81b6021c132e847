//! Allocation weight: share of each month's contribution that buys the ETF.
//!
//! w = 1 / (1 + e^-(momentum_z - volatility_z)), or 0 when either z-score is
//! absent.

use chrono::NaiveDate;

use super::indicator::IndicatorRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedRow {
    pub date: NaiveDate,
    pub weight: f64,
    pub price: f64,
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn allocation_weight(momentum_z: Option<f64>, volatility_z: Option<f64>) -> f64 {
    match (momentum_z, volatility_z) {
        (Some(m), Some(v)) => logistic(m - v),
        _ => 0.0,
    }
}

pub fn apply_weights(rows: &[IndicatorRow]) -> Vec<WeightedRow> {
    rows.iter()
        .map(|row| WeightedRow {
            date: row.date,
            weight: allocation_weight(row.momentum_z, row.volatility_z),
            price: row.price,
        })
        .collect()
}
