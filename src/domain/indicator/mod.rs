//! Strategy indicators derived from the monthly price series.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of one indicator
//! - `IndicatorRow`: all indicators for one month, the shape the rest of the
//!   pipeline consumes
//!
//! Absent values (warm-up, gaps, zero dispersion) are `None` throughout.

pub mod momentum;
pub mod volatility;
pub mod zscore;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::price::PricePoint;

/// Trailing months used to normalize momentum and volatility into z-scores.
pub const NORMALIZATION_WINDOW: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Returns,
    Momentum(usize),
    Volatility(usize),
    ZScore {
        source: Box<IndicatorType>,
        window: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn raw_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    pub fn first_valid(&self) -> Option<NaiveDate> {
        self.values.iter().find(|p| p.value.is_some()).map(|p| p.date)
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Returns => write!(f, "RET"),
            IndicatorType::Momentum(period) => write!(f, "MOM({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOL({})", period),
            IndicatorType::ZScore { source, window } => write!(f, "Z({},{})", source, window),
        }
    }
}

/// Every indicator for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub price: f64,
    pub momentum: Option<f64>,
    pub volatility: Option<f64>,
    pub momentum_z: Option<f64>,
    pub volatility_z: Option<f64>,
}

impl IndicatorRow {
    /// Both z-scores are defined.
    pub fn is_grounded(&self) -> bool {
        self.momentum_z.is_some() && self.volatility_z.is_some()
    }
}

/// Months of history needed before the first row can be grounded.
pub fn required_history(momentum_period: usize, volatility_period: usize) -> usize {
    momentum_period.max(volatility_period) + NORMALIZATION_WINDOW
}

pub fn compute_indicators(
    points: &[PricePoint],
    momentum_period: usize,
    volatility_period: usize,
) -> Vec<IndicatorRow> {
    let momentum = momentum::calculate_momentum(points, momentum_period);
    let volatility = volatility::calculate_volatility(points, volatility_period);
    let momentum_z = zscore::calculate_zscore(&momentum, NORMALIZATION_WINDOW);
    let volatility_z = zscore::calculate_zscore(&volatility, NORMALIZATION_WINDOW);

    for series in [&momentum, &volatility, &momentum_z, &volatility_z] {
        tracing::debug!(
            indicator = %series.indicator_type,
            valid = series.valid_count(),
            first_valid = ?series.first_valid(),
            "indicator computed"
        );
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| IndicatorRow {
            date: p.date,
            price: p.price,
            momentum: momentum.values[i].value,
            volatility: volatility.values[i].value,
            momentum_z: momentum_z.values[i].value,
            volatility_z: volatility_z.values[i].value,
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::make_points;
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Momentum(12).to_string(), "MOM(12)");
        assert_eq!(IndicatorType::Volatility(3).to_string(), "VOL(3)");
        let z = IndicatorType::ZScore {
            source: Box::new(IndicatorType::Momentum(12)),
            window: 12,
        };
        assert_eq!(z.to_string(), "Z(MOM(12),12)");
    }

    #[test]
    fn rows_align_with_prices() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let points = make_points(&prices);
        let rows = compute_indicators(&points, 3, 2);

        assert_eq!(rows.len(), points.len());
        for (row, point) in rows.iter().zip(&points) {
            assert_eq!(row.date, point.date);
            assert_eq!(row.price, point.price);
        }
    }

    #[test]
    fn short_series_is_never_grounded() {
        let points = make_points(&[100.0, 110.0, 121.0]);
        let rows = compute_indicators(&points, 3, 1);
        assert!(rows.iter().all(|r| !r.is_grounded()));
    }

    #[test]
    fn first_grounded_row_matches_required_history() {
        // alternating growth keeps both indicators dispersed
        let mut prices = vec![100.0];
        for i in 1..40 {
            let step = if i % 3 == 0 { 0.97 } else { 1.0 + 0.01 * (i % 5) as f64 };
            prices.push(prices[i - 1] * step);
        }
        let points = make_points(&prices);
        let rows = compute_indicators(&points, 4, 3);

        let first = rows.iter().position(|r| r.is_grounded()).unwrap();
        assert_eq!(first + 1, required_history(4, 3));
    }

    #[test]
    fn required_history_uses_longer_period() {
        assert_eq!(required_history(12, 3), 24);
        assert_eq!(required_history(3, 6), 18);
    }
}
