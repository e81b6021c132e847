//! Performance metrics over the simulated value series.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

use super::simulation::SimulationRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualReturn {
    pub year: i32,
    pub return_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub drawdown_pct: f64,
}

/// Headline numbers for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub months: usize,
    pub total_contributed: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub final_weight: f64,
}

impl Summary {
    pub fn compute(records: &[SimulationRecord], drawdowns: &[DrawdownPoint]) -> Self {
        let last = records.last();
        let total_contributed = last.map(|r| r.contributed).unwrap_or(0.0);
        let final_value = last.map(|r| r.total_value).unwrap_or(0.0);

        let total_return = if total_contributed > 0.0 {
            (final_value - total_contributed) / total_contributed
        } else {
            0.0
        };

        Summary {
            months: records.len(),
            total_contributed,
            final_value,
            total_return,
            max_drawdown: max_drawdown(drawdowns),
            final_weight: last.map(|r| r.weight).unwrap_or(0.0),
        }
    }
}

/// Year-over-year change of each year's last total value; the first year
/// has no baseline and reports 0.
pub fn annual_returns(records: &[SimulationRecord]) -> Vec<AnnualReturn> {
    let mut year_end: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        year_end.insert(record.date.year(), record.total_value);
    }

    let mut prev: Option<f64> = None;
    year_end
        .into_iter()
        .map(|(year, value)| {
            let return_pct = match prev {
                Some(p) if p > 0.0 => (value - p) / p,
                _ => 0.0,
            };
            prev = Some(value);
            AnnualReturn { year, return_pct }
        })
        .collect()
}

/// Decline of each total value from the running maximum before it.
pub fn drawdown_series(records: &[SimulationRecord]) -> Vec<DrawdownPoint> {
    let mut peak = f64::NEG_INFINITY;
    records
        .iter()
        .map(|record| {
            peak = peak.max(record.total_value);
            let drawdown_pct = if peak > 0.0 {
                (record.total_value - peak) / peak
            } else {
                0.0
            };
            DrawdownPoint {
                date: record.date,
                drawdown_pct,
            }
        })
        .collect()
}

/// Most negative drawdown, 0 for an empty series.
pub fn max_drawdown(drawdowns: &[DrawdownPoint]) -> f64 {
    drawdowns
        .iter()
        .map(|d| d.drawdown_pct)
        .fold(0.0, f64::min)
}

/// Two-decimal percentage, e.g. `-10.00%`.
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn annual_return_table(returns: &[AnnualReturn]) -> BTreeMap<i32, String> {
    returns
        .iter()
        .map(|r| (r.year, format_pct(r.return_pct)))
        .collect()
}
