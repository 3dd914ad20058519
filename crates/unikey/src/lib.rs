//! # Unikey
//!
//! Asymmetric key management: RSA key pairs, their packed wire formats,
//! password protection, key identities and dual-hash extended signatures.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): keys and everything derived from them
//!   - `PrivateKey` / `PublicKey`: RSA halves with OAEP and PSS
//!   - `AnyKey`: closed set of keys with default-deny capabilities
//!   - `KeyIdentity`: fingerprint, addresses, anonymous ids, matching
//!   - `KeyInfo`: algorithm, tag and KDF metadata
//!   - `KeyAddress`, `AnonymousId`, `Fingerprint`: identity tokens
//!
//! - **Codec** (`codec`): MessagePack tuples, maps and timestamps
//! - **Extended Signature** (`extended_signature`): `{exts, sign, sign2}`
//! - **Config** (`config`): password KDF and key generation settings
//!
//! ## Invariants
//!
//! - `unpack(pack(k)) == k` for private and public keys, byte for byte
//! - a private key and its public key share one fingerprint
//! - a wrong password surfaces as `FormatError::WrongPassword`, never as a
//!   generic parse failure
//! - engines are never used by two callers at once, and callers never wait
//!   for each other's operations
//!
//! ## Usage Example
//!
//! ```ignore
//! use unikey::{extended_signature, KeyIdentity, PasswordConfig, PrivateKey};
//!
//! let key = PrivateKey::generate(2048)?;
//! let stored = key.pack_with_password("secret", &PasswordConfig::default())?;
//! let key = PrivateKey::unpack_with_password(&stored, "secret")?;
//!
//! let signature = extended_signature::sign(&key, b"document", true)?;
//! let verified = extended_signature::verify(key.public_key(), &signature, b"document")?;
//! assert!(verified.is_some());
//! println!("{} at {}", key.fingerprint(), key.short_address());
//! ```

#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod extended_signature;

// Re-exports
pub use codec::KeyKind;
pub use config::{KeyConfig, PasswordConfig};
pub use domain::{
    Algorithm, AnonymousId, AnyKey, Fingerprint, KeyAddress, KeyIdentity, KeyInfo, PrivateKey,
    PublicKey,
};
pub use error::{Capability, FormatError, KeyError};
pub use extended_signature::ExtendedSignature;
pub use shared_crypto::{HashType, Prf};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
