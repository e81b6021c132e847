//! Report generation port trait.

use std::path::Path;

use crate::domain::error::DcaError;
use crate::domain::pipeline::SimulationOutput;

/// Port for writing simulation reports.
pub trait ReportPort {
    fn write(&self, output: &SimulationOutput, output_path: &Path) -> Result<(), DcaError>;
}
