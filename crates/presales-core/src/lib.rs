pub mod error;
pub mod time_value;
pub mod types;

pub mod allocation;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

pub use error::PresalesError;
pub use types::*;

/// Standard result type for all presales operations
pub type PresalesResult<T> = Result<T, PresalesError>;
