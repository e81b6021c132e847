//! Portfolio state threaded through the monthly simulation.

/// Convert an annual rate to the equivalent monthly compounding rate.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationState {
    pub shares_held: f64,
    pub cash_balance: f64,
    pub contributed: f64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one month's contribution.
    ///
    /// The unallocated share of the contribution joins cash after the
    /// existing balance has accrued its monthly interest.
    pub fn contribute(&mut self, amount: f64, weight: f64, price: f64, monthly_rate: f64) {
        let invest_in_etf = amount * weight;
        self.shares_held += invest_in_etf / price;
        self.cash_balance = self.cash_balance * (1.0 + monthly_rate) + amount * (1.0 - weight);
        self.contributed += amount;
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.shares_held * price + self.cash_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn new_state_is_empty() {
        let state = SimulationState::new();
        assert_eq!(state.shares_held, 0.0);
        assert_eq!(state.cash_balance, 0.0);
        assert_eq!(state.contributed, 0.0);
    }

    #[test]
    fn monthly_rate_compounds_to_annual() {
        let r = monthly_rate(0.02);
        assert_abs_diff_eq!((1.0 + r).powi(12), 1.02, epsilon = 1e-12);
    }

    #[test]
    fn monthly_rate_zero() {
        assert_abs_diff_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn full_weight_buys_shares() {
        let mut state = SimulationState::new();
        state.contribute(1000.0, 1.0, 100.0, 0.0);
        assert_abs_diff_eq!(state.shares_held, 10.0);
        assert_abs_diff_eq!(state.cash_balance, 0.0);
        assert_abs_diff_eq!(state.total_value(120.0), 1200.0);
    }

    #[test]
    fn split_weight() {
        let mut state = SimulationState::new();
        state.contribute(1000.0, 0.25, 50.0, 0.0);
        assert_abs_diff_eq!(state.shares_held, 5.0);
        assert_abs_diff_eq!(state.cash_balance, 750.0);
        assert_abs_diff_eq!(state.contributed, 1000.0);
    }

    #[test]
    fn accrual_precedes_contribution() {
        let mut state = SimulationState::new();
        state.contribute(1000.0, 0.0, 100.0, 0.01);
        // nothing to accrue yet
        assert_abs_diff_eq!(state.cash_balance, 1000.0);
        state.contribute(1000.0, 0.0, 100.0, 0.01);
        // only the prior balance earns interest
        assert_abs_diff_eq!(state.cash_balance, 2010.0, epsilon = 1e-9);
    }
}
