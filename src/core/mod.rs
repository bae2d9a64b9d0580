pub mod aggregator;
pub mod client;

pub use crate::domain::model::{LookupOutcome, LookupRequest, SafetyReport};
pub use crate::domain::ports::HolidayLookup;
pub use crate::utils::error::LookupError;
