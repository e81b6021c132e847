//! Momentum: relative price change over a trailing window.
//!
//! MOM(n)[i] = P[i] / P[i-n] - 1
//! Warmup: first n rows absent. A zero base price yields an absent value.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_momentum(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if period > 0 && i >= period {
                let base = points[i - period].price;
                (base != 0.0).then(|| point.price / base - 1.0)
            } else {
                None
            };
            IndicatorPoint {
                date: point.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Momentum(period),
        values,
    }
}
