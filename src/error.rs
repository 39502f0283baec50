use thiserror::Error;

/// Error type for every ORE operation.
///
/// Errors are either permanent misuse signals (bad parameters, wrong
/// lifecycle state, mismatched ciphertexts) or a failure of the entropy
/// source. Nothing is retried internally.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OreError {
    /// The entropy source was unavailable or returned a short read
    #[error("could not read enough randomness from the entropy source")]
    Randomness,

    /// Block/out-block length out of bounds, or a PRP domain that is odd or too wide
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A key, input or output buffer had the wrong length
    #[error("invalid length: expected {expected} bytes but got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("secret key is not initialized (or has been cleared)")]
    KeyNotInitialized,

    #[error("ciphertext is not initialized (or has been cleared)")]
    CiphertextNotInitialized,

    /// Two ciphertexts (or a key and a ciphertext) were built under different parameters
    #[error("parameters do not match")]
    ParamsMismatch,

    /// The message is wider than the selected PRF supports
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("could not allocate ciphertext buffer")]
    Allocation,

    /// A parsed ciphertext holds a value no encryption could have produced
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),
}

pub type OreResult<T> = Result<T, OreError>;

impl OreError {
    pub(crate) fn check_len(expected: usize, actual: usize) -> OreResult<()> {
        if expected != actual {
            return Err(OreError::InvalidLength { expected, actual });
        }
        Ok(())
    }
}
