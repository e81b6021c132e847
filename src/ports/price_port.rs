//! Price data access port trait.

use crate::domain::error::DcaError;
use crate::domain::price::PricePoint;

/// Supplies the full monthly close history for one instrument.
pub trait PriceSource {
    /// All available monthly closes for `ticker`, oldest first, one row per
    /// calendar month, rows with a missing close already dropped.
    fn fetch_monthly(&self, ticker: &str) -> Result<Vec<PricePoint>, DcaError>;
}
