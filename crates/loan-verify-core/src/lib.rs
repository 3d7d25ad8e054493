pub mod dates;
pub mod error;
pub mod oracle;
pub mod rounding;
pub mod schedule;
pub mod service;
pub mod types;

pub use error::LoanVerifyError;
pub use types::*;

/// Standard result type for all loan-verify operations
pub type LoanVerifyResult<T> = Result<T, LoanVerifyError>;
