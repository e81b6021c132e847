//! Rolling z-score of another indicator.
//!
//! Z[i] = (X[i] - mean(X[i-w+1..=i])) / sample_stddev(X[i-w+1..=i])
//! Absent unless all w trailing values are present. A window with zero
//! dispersion is absent rather than infinite.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{mean, sample_stddev, trailing_window};

pub fn calculate_zscore(source: &IndicatorSeries, window: usize) -> IndicatorSeries {
    let raw = source.raw_values();

    let values = source
        .values
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = trailing_window(&raw, i, window).and_then(|w| {
                let sd = sample_stddev(&w)?;
                if sd == 0.0 {
                    return None;
                }
                let z = (w[w.len() - 1] - mean(&w)) / sd;
                z.is_finite().then_some(z)
            });
            IndicatorPoint {
                date: point.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::ZScore {
            source: Box::new(source.indicator_type.clone()),
            window,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use approx::assert_abs_diff_eq;

    fn make_series(values: &[Option<f64>]) -> IndicatorSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        IndicatorSeries {
            indicator_type: IndicatorType::Momentum(3),
            values: values
                .iter()
                .enumerate()
                .map(|(i, &value)| IndicatorPoint {
                    date: start + chrono::Duration::days(31 * i as i64),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn zscore_warmup() {
        let series = make_series(&[Some(1.0), Some(2.0), Some(3.0), Some(5.0)]);
        let z = calculate_zscore(&series, 3);

        assert!(z.values[0].value.is_none());
        assert!(z.values[1].value.is_none());
        assert!(z.values[2].value.is_some());
        assert!(z.values[3].value.is_some());
    }

    #[test]
    fn zscore_known_value() {
        let series = make_series(&[Some(1.0), Some(2.0), Some(3.0)]);
        let z = calculate_zscore(&series, 3);

        // mean 2, sample sd 1 -> (3 - 2) / 1
        assert_abs_diff_eq!(z.values[2].value.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zscore_absent_source_propagates() {
        let series = make_series(&[None, Some(2.0), Some(3.0), Some(4.0), Some(6.0)]);
        let z = calculate_zscore(&series, 3);

        assert!(z.values[2].value.is_none());
        assert!(z.values[3].value.is_some());
        assert!(z.values[4].value.is_some());
    }

    #[test]
    fn zscore_zero_dispersion_is_absent() {
        let series = make_series(&[Some(0.05); 12]);
        let z = calculate_zscore(&series, 12);
        assert!(z.values.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn zscore_type_wraps_source() {
        let series = make_series(&[Some(1.0)]);
        let z = calculate_zscore(&series, 12);
        assert_eq!(z.indicator_type.to_string(), "Z(MOM(3),12)");
    }
}
