//! Errors produced by the crypto suite facade.

use std::fmt;

/// Errors that can occur while using a [`crate::CryptoSuite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CryptoError {
    /// The PRNG backend failed to produce randomness.
    RngFailure,
    /// A key-agreement input was the wrong size or an invalid curve point.
    InvalidKeyMaterial { what: &'static str },
    /// AEAD seal failed (should not happen for well-formed inputs).
    SealFailure,
    /// AEAD authentication tag did not verify, or ciphertext was truncated.
    MacMismatch,
    /// Signature generation failed.
    SignFailure,
    /// Signature verification failed.
    InvalidSignature,
}

impl std::error::Error for CryptoError {}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RngFailure => write!(f, "random number generator failure"),
            Self::InvalidKeyMaterial { what } => write!(f, "invalid key material: {what}"),
            Self::SealFailure => write!(f, "AEAD seal failed"),
            Self::MacMismatch => write!(f, "AEAD authentication tag mismatch"),
            Self::SignFailure => write!(f, "signature generation failed"),
            Self::InvalidSignature => write!(f, "signature verification failed"),
        }
    }
}
