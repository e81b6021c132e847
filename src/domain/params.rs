//! User-tunable strategy parameters and their allowed ranges.
//!
//! Parameters are checked here, before any price data is fetched.

use super::error::DcaError;
use super::simulation::SimulationParams;

pub const DEFAULT_TICKER: &str = "0050.TW";
pub const DEFAULT_MONTHLY_INVEST: f64 = 35_000.0;
pub const DEFAULT_START_YEAR: i32 = 2004;
pub const DEFAULT_MOMENTUM_PERIOD: usize = 12;
pub const DEFAULT_VOLATILITY_PERIOD: usize = 3;
pub const DEFAULT_CASH_RATE: f64 = 0.02;

pub const START_YEAR_RANGE: (i32, i32) = (2004, 2024);
pub const MOMENTUM_PERIOD_RANGE: (usize, usize) = (3, 24);
pub const VOLATILITY_PERIOD_RANGE: (usize, usize) = (1, 12);
pub const CASH_RATE_RANGE: (f64, f64) = (0.0, 0.05);

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub ticker: String,
    pub monthly_invest: f64,
    pub start_year: i32,
    pub momentum_period: usize,
    pub volatility_period: usize,
    pub cash_rate: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            monthly_invest: DEFAULT_MONTHLY_INVEST,
            start_year: DEFAULT_START_YEAR,
            momentum_period: DEFAULT_MOMENTUM_PERIOD,
            volatility_period: DEFAULT_VOLATILITY_PERIOD,
            cash_rate: DEFAULT_CASH_RATE,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), DcaError> {
        self.validate_ticker()?;
        validate_monthly_invest(self.monthly_invest)?;
        validate_start_year(self.start_year)?;
        validate_period("momentum_period", self.momentum_period, MOMENTUM_PERIOD_RANGE)?;
        validate_period(
            "volatility_period",
            self.volatility_period,
            VOLATILITY_PERIOD_RANGE,
        )?;
        validate_cash_rate(self.cash_rate)?;
        Ok(())
    }

    /// The only check a bare price download needs.
    pub fn validate_ticker(&self) -> Result<(), DcaError> {
        if self.ticker.trim().is_empty() {
            return Err(DcaError::invalid("ticker", "ticker must not be empty"));
        }
        Ok(())
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            monthly_invest: self.monthly_invest,
            annual_cash_rate: self.cash_rate,
        }
    }
}

fn validate_monthly_invest(value: f64) -> Result<(), DcaError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DcaError::invalid(
            "monthly_invest",
            "monthly_invest must be positive",
        ));
    }
    Ok(())
}

fn validate_start_year(value: i32) -> Result<(), DcaError> {
    let (lo, hi) = START_YEAR_RANGE;
    if !(lo..=hi).contains(&value) {
        return Err(DcaError::invalid(
            "start_year",
            format!("start_year must be between {} and {}", lo, hi),
        ));
    }
    Ok(())
}

fn validate_period(field: &str, value: usize, (lo, hi): (usize, usize)) -> Result<(), DcaError> {
    if !(lo..=hi).contains(&value) {
        return Err(DcaError::invalid(
            field,
            format!("{} must be between {} and {} months", field, lo, hi),
        ));
    }
    Ok(())
}

fn validate_cash_rate(value: f64) -> Result<(), DcaError> {
    let (lo, hi) = CASH_RATE_RANGE;
    if !(lo..=hi).contains(&value) {
        return Err(DcaError::invalid(
            "cash_rate",
            format!("cash_rate must be between {} and {}", lo, hi),
        ));
    }
    Ok(())
}
