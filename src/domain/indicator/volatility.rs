//! Volatility: dispersion of month-over-month returns.
//!
//! RET[i] = P[i] / P[i-1] - 1, absent at i = 0
//! VOL(n)[i] = sample stddev of RET[i-n+1..=i]
//! Warmup: first n rows absent; with n = 1 the sample stddev is never defined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{sample_stddev, trailing_window};
use crate::domain::price::PricePoint;

pub fn calculate_returns(points: &[PricePoint]) -> IndicatorSeries {
    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if i == 0 {
                None
            } else {
                let prev = points[i - 1].price;
                (prev != 0.0).then(|| point.price / prev - 1.0)
            };
            IndicatorPoint {
                date: point.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Returns,
        values,
    }
}

pub fn calculate_volatility(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let returns = calculate_returns(points).raw_values();

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| IndicatorPoint {
            date: point.date,
            value: trailing_window(&returns, i, period).and_then(|w| sample_stddev(&w)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}
