//! # Key Errors
//!
//! Error taxonomy for key construction and use.
//!
//! - `Unsupported`: the key variant cannot perform the operation
//! - `Format`: malformed or wrong-kind input; `FormatError::WrongPassword`
//!   is the distinguished wrong-password case
//! - `Primitive` / `Crypto`: the underlying primitive failed
//!
//! Constructors fail atomically: an `Err` always means no key was produced.

use crate::codec::KeyKind;
use shared_crypto::CryptoError;
use std::fmt;
use thiserror::Error;

/// Boxed cause kept on wrapped parse failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Operations a key may or may not support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Public-key encryption
    Encrypt,
    /// Private-key decryption
    Decrypt,
    /// Signature creation
    Sign,
    /// Signature verification
    Verify,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Encrypt => "encrypt",
            Capability::Decrypt => "decrypt",
            Capability::Sign => "sign",
            Capability::Verify => "verify signatures",
        })
    }
}

/// Malformed, wrong-kind or undecryptable packed input.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Packed bytes hold a different kind of key than requested
    #[error("the key is {found}, not {expected}")]
    WrongKind {
        /// Kind the caller asked for
        expected: KeyKind,
        /// Kind found in the packed bytes
        found: KeyKind,
    },

    /// Discriminant is not a known key kind
    #[error("bad or unknown key type: {0}")]
    UnknownKind(i64),

    /// Key is wrapped with a password; use the password unwrap path
    #[error("key is password protected")]
    PasswordProtected,

    /// Integrity check after password-based decryption failed
    #[error("wrong password")]
    WrongPassword,

    /// Key address bytes or text failed validation
    #[error("invalid key address: {0}")]
    InvalidAddress(String),

    /// Structurally invalid input
    #[error("{reason}")]
    Malformed {
        /// What could not be parsed
        reason: String,
        /// Underlying codec, primitive or cipher error
        #[source]
        source: Option<Cause>,
    },
}

impl FormatError {
    /// Malformed input without an underlying cause.
    pub fn malformed(reason: impl Into<String>) -> Self {
        FormatError::Malformed {
            reason: reason.into(),
            source: None,
        }
    }

    /// Malformed input wrapping the error that exposed it.
    pub fn malformed_with<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FormatError::Malformed {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors produced by key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Operation not supported by this key variant
    #[error("this key can't {0}")]
    Unsupported(Capability),

    /// Malformed or wrong-kind packed data
    #[error(transparent)]
    Format(#[from] FormatError),

    /// RSA primitive failed
    #[error("RSA operation failed: {0}")]
    Primitive(#[from] rsa::Error),

    /// Digest, KDF or cipher failed outside parsing
    #[error("crypto operation failed: {0}")]
    Crypto(#[from] CryptoError),

    /// Reader or file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl KeyError {
    /// True for the distinguished wrong-password failure.
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, KeyError::Format(FormatError::WrongPassword))
    }

    /// True for any format failure, wrong password included.
    pub fn is_format_error(&self) -> bool {
        matches!(self, KeyError::Format(_))
    }

    /// Wrap as a parse failure, leaving format errors untouched.
    pub(crate) fn into_format(self, reason: &str) -> KeyError {
        match self {
            KeyError::Format(_) => self,
            other => FormatError::malformed_with(reason, other).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password_is_a_format_error() {
        let err = KeyError::from(FormatError::WrongPassword);
        assert!(err.is_wrong_password());
        assert!(err.is_format_error());
        assert_eq!(err.to_string(), "wrong password");
    }

    #[test]
    fn test_wrong_kind_message() {
        let err = FormatError::WrongKind {
            expected: KeyKind::Private,
            found: KeyKind::Public,
        };
        assert_eq!(err.to_string(), "the key is public, not private");
    }

    #[test]
    fn test_into_format_keeps_wrong_password() {
        let err = KeyError::from(FormatError::WrongPassword).into_format("outer");
        assert!(err.is_wrong_password());

        let wrapped = KeyError::Config("x".into()).into_format("outer");
        assert!(wrapped.is_format_error());
        assert!(!wrapped.is_wrong_password());
        assert!(std::error::Error::source(&wrapped).is_some());
    }

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            KeyError::Unsupported(Capability::Decrypt).to_string(),
            "this key can't decrypt"
        );
    }
}
