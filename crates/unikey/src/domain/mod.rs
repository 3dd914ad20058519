//! Key domain: key types, identity derivations and the engine pool.

pub mod address;
pub mod anonymous_id;
pub mod fingerprint;
pub mod key;
pub mod key_info;
mod padding;
pub mod password;
mod pool;
pub mod private_key;
pub mod public_key;

pub use address::{KeyAddress, LONG_ADDRESS_SIZE, SHORT_ADDRESS_SIZE};
pub use anonymous_id::{AnonymousId, ANONYMOUS_ID_SIZE};
pub use fingerprint::{Fingerprint, FINGERPRINT_SIZE};
pub use key::{AnyKey, KeyIdentity};
pub use key_info::{Algorithm, KeyInfo};
pub use password::PRIVATE_KEY_SALT;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
