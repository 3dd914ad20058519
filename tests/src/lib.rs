//! # Unikey Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion groups, driven by benches/key_benchmarks.rs
//! └── integration/      # Flows across shared-crypto and unikey
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p unikey-tests
//!
//! # Flows only
//! cargo test -p unikey-tests integration::
//!
//! # Benchmarks
//! cargo bench -p unikey-tests
//! ```

#![allow(dead_code)]

pub mod benchmarks;
pub mod integration;
