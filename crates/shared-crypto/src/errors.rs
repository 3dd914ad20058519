//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed for a reason other than authentication
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Authenticated decryption rejected the ciphertext (wrong key or tampering)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Digest algorithm name not in the registry
    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    /// Pseudo-random function name not recognized
    #[error("Unknown PRF: {0}")]
    UnknownPrf(String),

    /// Key derivation could not run with the given parameters
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Invalid input for cryptographic operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
