//! # Shared Crypto - Primitive Collaborators
//!
//! Digest, MAC, KDF, checksum and symmetric primitives consumed by the key
//! layer. Nothing in here knows about key formats.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-1/2/3, HMAC-SHA256 | Hash registry, fingerprints, anonymous ids |
//! | `kdf` | PBKDF2 | Password-derived keys |
//! | `checksum` | CRC32 | Wrong-password detection, address checksums |
//! | `symmetric` | AES-256-GCM | Password-protected key blobs |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod errors;
pub mod hashing;
pub mod kdf;
pub mod symmetric;

// Re-exports
pub use checksum::{crc32, crc32_bytes, verify_crc32_bytes};
pub use errors::CryptoError;
pub use hashing::{hmac_sha256, sha256, sha3_384, sha512, verify_hmac_sha256, HashType};
pub use kdf::{derive_key, Prf};
pub use symmetric::SymmetricKey;

/// Re-exported so callers can feed key material into registry digests.
pub use sha2::digest::DynDigest;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
