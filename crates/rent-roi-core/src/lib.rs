pub mod cash_flow;
pub mod error;
pub mod financing;
pub mod property;
pub mod report;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::RentRoiError;
pub use types::*;

/// Standard result type for all rent-roi operations
pub type RentRoiResult<T> = Result<T, RentRoiError>;
