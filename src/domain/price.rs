//! Monthly price series representation and preparation.

use chrono::{Datelike, NaiveDate};

use super::error::DcaError;

/// One monthly close for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    fn month_key(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }
}

/// Sort oldest first, drop non-finite prices, and keep the last row of each
/// calendar month.
pub fn normalize_series(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.retain(|p| p.price.is_finite());
    points.sort_by_key(|p| p.date);

    let mut out: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.month_key() == point.month_key() => *last = point,
            _ => out.push(point),
        }
    }
    out
}

pub fn filter_from_year(points: &[PricePoint], start_year: i32) -> Vec<PricePoint> {
    points
        .iter()
        .filter(|p| p.date.year() >= start_year)
        .copied()
        .collect()
}

/// Rejects prices the simulator cannot divide by.
pub fn validate_prices(points: &[PricePoint]) -> Result<(), DcaError> {
    match points.iter().find(|p| !(p.price.is_finite() && p.price > 0.0)) {
        Some(bad) => Err(DcaError::invalid(
            "price",
            format!("{} on {} is not a positive number", bad.price, bad.date),
        )),
        None => Ok(()),
    }
}
