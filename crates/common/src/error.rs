use thiserror::Error;

/// Shown when the endpoint rejects a token without saying why.
pub const FALLBACK_REJECTION_MESSAGE: &str = "Verification failed. The link may have expired.";

/// The two ways an email verification can fail.
///
/// `Display` renders the message the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid verification link")]
    MissingToken,

    #[error("{}", rejection_message(.0))]
    VerificationRejected(Option<String>),
}

impl Error {
    /// Rejection carrying the server's reason, if it gave a non-blank one.
    pub fn rejected(reason: Option<String>) -> Self {
        Error::VerificationRejected(reason.filter(|r| !r.trim().is_empty()))
    }
}

fn rejection_message(reason: &Option<String>) -> &str {
    reason.as_deref().unwrap_or(FALLBACK_REJECTION_MESSAGE)
}

pub type Result<T> = std::result::Result<T, Error>;
