pub mod attempt;
pub mod error;

pub use attempt::{VerificationAttempt, VerificationStatus};
pub use error::{Error, Result};
