//! PM2.5 to AQI conversion and sensor correction formulas.
//!
//! Everything here is pure: no I/O and no shared state.

pub mod converter;
pub mod correction;

pub use converter::{convert_to_index, AqiCategory, AqiResult, MAX_VALID_CONCENTRATION};
pub use correction::CorrectionModel;
