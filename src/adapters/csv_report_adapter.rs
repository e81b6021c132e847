//! CSV report adapter implementing ReportPort.
//!
//! One row per simulated month; absent indicator values are left empty.

use std::path::Path;

use serde::Serialize;

use crate::adapters::csv_adapter::csv_io_error;
use crate::domain::error::DcaError;
use crate::domain::pipeline::SimulationOutput;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
struct ReportRow {
    date: String,
    price: f64,
    momentum: Option<f64>,
    volatility: Option<f64>,
    momentum_z: Option<f64>,
    volatility_z: Option<f64>,
    weight: f64,
    shares_held: f64,
    cash_balance: f64,
    contributed: f64,
    total_value: f64,
    drawdown_pct: f64,
}

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, output: &SimulationOutput, output_path: &Path) -> Result<(), DcaError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_io_error)?;

        let rows = output
            .indicators
            .iter()
            .zip(&output.records)
            .zip(&output.drawdowns);
        for ((ind, rec), dd) in rows {
            debug_assert!(ind.date == rec.date && rec.date == dd.date);
            wtr.serialize(ReportRow {
                date: rec.date.format("%Y-%m-%d").to_string(),
                price: rec.price,
                momentum: ind.momentum,
                volatility: ind.volatility,
                momentum_z: ind.momentum_z,
                volatility_z: ind.volatility_z,
                weight: rec.weight,
                shares_held: rec.shares_held,
                cash_balance: rec.cash_balance,
                contributed: rec.contributed,
                total_value: rec.total_value,
                drawdown_pct: dd.drawdown_pct,
            })
            .map_err(csv_io_error)?;
        }
        wtr.flush()?;

        tracing::info!(path = %output_path.display(), rows = output.records.len(), "report written");
        Ok(())
    }
}
