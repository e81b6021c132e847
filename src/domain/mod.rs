//! Core domain types and logic.

pub mod error;
pub mod price;
pub mod indicator;
pub mod indicator_helpers;
pub mod weight;
pub mod portfolio;
pub mod simulation;
pub mod metrics;
pub mod params;
pub mod pipeline;
