pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, OutputFormat};

pub use config::ClientConfig;
pub use crate::core::aggregator::{check_safe, SafetyAggregator};
pub use crate::core::client::{check, HolidayClient};
pub use domain::model::{LookupOutcome, LookupRequest, SafetyReport};
pub use domain::ports::HolidayLookup;
pub use utils::error::{GateError, LookupError, Result};
