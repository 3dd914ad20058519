//! CRC32 checksums (IEEE polynomial) via crc32fast.
//!
//! Not a cryptographic integrity check; used to detect a wrong password
//! after decryption and to guard key addresses against typos.

/// Size of a serialized checksum.
pub const CRC32_SIZE: usize = 4;

/// CRC32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// CRC32 of `data` as big-endian bytes, the persisted form.
pub fn crc32_bytes(data: &[u8]) -> [u8; CRC32_SIZE] {
    crc32(data).to_be_bytes()
}

/// Check `data` against a persisted big-endian checksum.
pub fn verify_crc32_bytes(data: &[u8], expected: &[u8]) -> bool {
    expected.len() == CRC32_SIZE && crc32_bytes(data) == expected
}
