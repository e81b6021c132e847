//! Port traits at the I/O seams: price data, configuration, reports.

pub mod config_port;
pub mod price_port;
pub mod report_port;
