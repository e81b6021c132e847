//! Monthly dollar-cost-averaging simulation.
//!
//! A fold over the weighted rows: each month's contribution is split by the
//! row's weight between ETF shares and interest-bearing cash, and one
//! `SimulationRecord` is emitted per input row.

use chrono::NaiveDate;

use super::error::DcaError;
use super::portfolio::{SimulationState, monthly_rate};
use super::weight::WeightedRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub monthly_invest: f64,
    pub annual_cash_rate: f64,
}

/// Snapshot of the portfolio at the end of one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRecord {
    pub date: NaiveDate,
    pub weight: f64,
    pub price: f64,
    pub shares_held: f64,
    pub cash_balance: f64,
    pub contributed: f64,
    pub total_value: f64,
}

pub fn simulate(
    rows: &[WeightedRow],
    params: &SimulationParams,
) -> Result<Vec<SimulationRecord>, DcaError> {
    if !(params.monthly_invest.is_finite() && params.monthly_invest > 0.0) {
        return Err(DcaError::invalid(
            "monthly_invest",
            format!("{} is not a positive amount", params.monthly_invest),
        ));
    }
    if !(params.annual_cash_rate.is_finite() && params.annual_cash_rate >= 0.0) {
        return Err(DcaError::invalid(
            "cash_rate",
            format!("{} must be a non-negative rate", params.annual_cash_rate),
        ));
    }
    if let Some(bad) = rows
        .iter()
        .find(|r| !(r.price.is_finite() && r.price > 0.0))
    {
        return Err(DcaError::invalid(
            "price",
            format!("{} on {} is not a positive number", bad.price, bad.date),
        ));
    }
    if let Some(bad) = rows.iter().find(|r| !(0.0..=1.0).contains(&r.weight)) {
        return Err(DcaError::invalid(
            "weight",
            format!("{} on {} is outside [0, 1]", bad.weight, bad.date),
        ));
    }

    let rate = monthly_rate(params.annual_cash_rate);

    let records = rows
        .iter()
        .scan(SimulationState::new(), |state, row| {
            state.contribute(params.monthly_invest, row.weight, row.price, rate);
            Some(SimulationRecord {
                date: row.date,
                weight: row.weight,
                price: row.price,
                shares_held: state.shares_held,
                cash_balance: state.cash_balance,
                contributed: state.contributed,
                total_value: state.total_value(row.price),
            })
        })
        .collect();

    Ok(records)
}
