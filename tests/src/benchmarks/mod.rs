//! # Unikey Benchmarks
//!
//! Criterion groups per concern. Keys are generated once per group; key
//! generation itself is measured separately with a small sample size.

pub mod identity;
pub mod key_operations;
