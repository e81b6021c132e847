//! End-to-end run: price series in, simulation output out.
//!
//! Stages run strictly in order and each consumes the previous stage's full
//! output: filter, indicators, weights, simulation, analysis.

use super::error::DcaError;
use super::indicator::{IndicatorRow, compute_indicators, required_history};
use super::metrics::{
    AnnualReturn, DrawdownPoint, Summary, annual_returns, drawdown_series, max_drawdown,
};
use super::params::StrategyParams;
use super::price::{PricePoint, filter_from_year, validate_prices};
use super::simulation::{SimulationRecord, simulate};
use super::weight::apply_weights;
use crate::ports::price_port::PriceSource;

#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub params: StrategyParams,
    pub indicators: Vec<IndicatorRow>,
    pub records: Vec<SimulationRecord>,
    pub annual_returns: Vec<AnnualReturn>,
    pub drawdowns: Vec<DrawdownPoint>,
    pub max_drawdown: f64,
    pub summary: Summary,
}

impl SimulationOutput {
    /// Months where both z-scores are defined and the weight is live.
    pub fn valid_rows(&self) -> usize {
        self.indicators.iter().filter(|r| r.is_grounded()).count()
    }

    /// `InsufficientHistory` when no month ever received a live weight.
    pub fn history_warning(&self) -> Option<DcaError> {
        if self.valid_rows() > 0 {
            return None;
        }
        Some(DcaError::InsufficientHistory {
            rows: self.records.len(),
            valid_rows: 0,
            required: required_history(self.params.momentum_period, self.params.volatility_period),
        })
    }
}

/// Run the simulation over an already-fetched price history.
pub fn run_simulation(
    history: &[PricePoint],
    params: &StrategyParams,
) -> Result<SimulationOutput, DcaError> {
    params.validate()?;
    simulate_validated(history, params)
}

fn simulate_validated(
    history: &[PricePoint],
    params: &StrategyParams,
) -> Result<SimulationOutput, DcaError> {
    let prices = filter_from_year(history, params.start_year);
    if prices.is_empty() {
        return Err(DcaError::unavailable(
            &params.ticker,
            format!("no prices from {} onward", params.start_year),
        ));
    }
    validate_prices(&prices)?;
    tracing::info!(
        months = prices.len(),
        first = %prices[0].date,
        last = %prices[prices.len() - 1].date,
        "price series filtered"
    );

    let indicators = compute_indicators(&prices, params.momentum_period, params.volatility_period);
    let weighted = apply_weights(&indicators);
    let records = simulate(&weighted, &params.simulation_params())?;

    let annual = annual_returns(&records);
    let drawdowns = drawdown_series(&records);
    let max_dd = max_drawdown(&drawdowns);
    let summary = Summary::compute(&records, &drawdowns);

    Ok(SimulationOutput {
        params: params.clone(),
        indicators,
        records,
        annual_returns: annual,
        drawdowns,
        max_drawdown: max_dd,
        summary,
    })
}

/// Validate, fetch, then simulate.
pub fn run_pipeline(
    source: &dyn PriceSource,
    params: &StrategyParams,
) -> Result<SimulationOutput, DcaError> {
    params.validate()?;

    tracing::info!(ticker = %params.ticker, "fetching monthly prices");
    let history = source.fetch_monthly(&params.ticker)?;
    if history.is_empty() {
        return Err(DcaError::unavailable(&params.ticker, "provider returned no prices"));
    }

    let output = simulate_validated(&history, params)?;
    if let Some(warning) = output.history_warning() {
        tracing::warn!("{warning}");
    }
    Ok(output)
}
