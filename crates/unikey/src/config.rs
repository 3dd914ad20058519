//! Key handling configuration.
//!
//! # Environment Variables
//!
//! - `UNIKEY_KDF_ROUNDS`: PBKDF2 rounds for password protection (default: 100000)
//! - `UNIKEY_KDF_PRF`: PBKDF2 PRF name (default: HMAC_SHA256)
//! - `UNIKEY_KEY_BITS`: default RSA strength for new keys (default: 2048)
//!
//! Unparseable values fall back to the defaults.

use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use shared_crypto::Prf;
use std::env;

/// Production PBKDF2 rounds.
pub const DEFAULT_KDF_ROUNDS: u32 = 100_000;

/// PBKDF2 rounds for tests, where key derivation cost dominates.
pub const TESTING_KDF_ROUNDS: u32 = 250;

/// Default RSA strength for generated keys.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest RSA strength accepted for generated keys.
pub const MIN_KEY_BITS: usize = 1024;

/// Password protection parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// PBKDF2 iteration count
    pub kdf_rounds: u32,
    /// PBKDF2 pseudo-random function
    #[serde(with = "prf_name")]
    pub prf: Prf,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            kdf_rounds: DEFAULT_KDF_ROUNDS,
            prf: Prf::HmacSha256,
        }
    }
}

impl PasswordConfig {
    /// Cheap derivation profile for tests.
    pub fn testing() -> Self {
        Self {
            kdf_rounds: TESTING_KDF_ROUNDS,
            ..Self::default()
        }
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            kdf_rounds: lookup("UNIKEY_KDF_ROUNDS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.kdf_rounds),
            prf: lookup("UNIKEY_KDF_PRF")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.prf),
        }
    }

    /// Reject parameters that cannot derive a key.
    pub fn validate(&self) -> Result<(), KeyError> {
        if self.kdf_rounds == 0 {
            return Err(KeyError::Config("kdf_rounds cannot be 0".to_string()));
        }
        if self.prf == Prf::None {
            return Err(KeyError::Config("a PRF is required for key derivation".to_string()));
        }
        Ok(())
    }

    /// Builder-style method to set the round count
    pub fn with_kdf_rounds(mut self, rounds: u32) -> Self {
        self.kdf_rounds = rounds;
        self
    }

    /// Builder-style method to set the PRF
    pub fn with_prf(mut self, prf: Prf) -> Self {
        self.prf = prf;
        self
    }
}

/// Settings for tools that create and store keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// RSA strength for generated keys
    pub default_bits: usize,
    /// Password protection parameters
    pub password: PasswordConfig,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            default_bits: DEFAULT_KEY_BITS,
            password: PasswordConfig::default(),
        }
    }
}

impl KeyConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            default_bits: lookup("UNIKEY_KEY_BITS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_KEY_BITS),
            password: PasswordConfig::from_lookup(&lookup),
        }
    }

    /// Validate key strength and password parameters.
    pub fn validate(&self) -> Result<(), KeyError> {
        validate_bits(self.default_bits)?;
        self.password.validate()
    }

    /// Builder-style method to set the key strength
    pub fn with_default_bits(mut self, bits: usize) -> Self {
        self.default_bits = bits;
        self
    }

    /// Builder-style method to set password parameters
    pub fn with_password(mut self, password: PasswordConfig) -> Self {
        self.password = password;
        self
    }
}

/// Check an RSA strength requested for key generation.
pub fn validate_bits(bits: usize) -> Result<(), KeyError> {
    if bits < MIN_KEY_BITS {
        return Err(KeyError::Config(format!(
            "key strength {bits} is below the {MIN_KEY_BITS}-bit minimum"
        )));
    }
    if bits % 8 != 0 {
        return Err(KeyError::Config(format!(
            "key strength {bits} is not a whole number of bytes"
        )));
    }
    Ok(())
}

mod prf_name {
    use serde::{Deserialize, Deserializer, Serializer};
    use shared_crypto::Prf;

    pub fn serialize<S: Serializer>(prf: &Prf, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(prf.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Prf, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PasswordConfig::default();
        assert_eq!(config.kdf_rounds, 100_000);
        assert_eq!(config.prf, Prf::HmacSha256);
        assert!(config.validate().is_ok());

        assert_eq!(PasswordConfig::testing().kdf_rounds, 250);
        assert_eq!(KeyConfig::default().default_bits, 2048);
    }

    #[test]
    fn test_validate_rejects_unusable_parameters() {
        assert!(PasswordConfig::default().with_kdf_rounds(0).validate().is_err());
        assert!(PasswordConfig::default().with_prf(Prf::None).validate().is_err());
        assert!(KeyConfig::default().with_default_bits(512).validate().is_err());
        assert!(KeyConfig::default().with_default_bits(2047).validate().is_err());
        assert!(KeyConfig::default().with_default_bits(4096).validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = KeyConfig::from_lookup(lookup(&[
            ("UNIKEY_KDF_ROUNDS", "5000"),
            ("UNIKEY_KDF_PRF", "HMAC_SHA512"),
            ("UNIKEY_KEY_BITS", "4096"),
        ]));
        assert_eq!(config.default_bits, 4096);
        assert_eq!(config.password.kdf_rounds, 5000);
        assert_eq!(config.password.prf, Prf::HmacSha512);
    }

    #[test]
    fn test_bad_env_values_fall_back() {
        let config = PasswordConfig::from_lookup(lookup(&[
            ("UNIKEY_KDF_ROUNDS", "lots"),
            ("UNIKEY_KDF_PRF", "HMAC_MD5"),
        ]));
        assert_eq!(config, PasswordConfig::default());
    }

    #[test]
    fn test_serde_uses_prf_names() {
        let config = PasswordConfig::testing().with_prf(Prf::HmacSha1);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"HMAC_SHA1\""), "PRF should serialize by name: {json}");

        let back: PasswordConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: PasswordConfig = serde_json::from_str(r#"{"kdf_rounds": 10}"#).unwrap();
        assert_eq!(partial.prf, Prf::HmacSha256, "missing fields take defaults");
    }
}
