use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in an action flow.
///
/// None of these are fatal to the process: each one resolves to a failed
/// flow that the caller may re-initiate with fresh inputs.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing user input. Raised before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No payment coin in the wallet covers the required amount.
    #[error("insufficient balance: no coin covers {required} base units")]
    InsufficientFunds { required: u64 },

    /// The sponsor relay rejected the request or was unreachable.
    #[error("sponsorship relay failed: {0}")]
    Relay(String),

    /// The wallet refused to sign or returned no signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Final execution was rejected or the submission call failed.
    /// Terminal for the attempt; a consumed digest is never resubmitted.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// A read-only chain query failed.
    #[error("chain query failed: {0}")]
    Query(String),

    /// Local encoding failure (payload serialization).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors the user can fix by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InsufficientFunds { .. }
        )
    }
}
