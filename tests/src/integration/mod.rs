//! # Integration Flows
//!
//! Scenarios where keys, identities and signatures from `unikey` meet the
//! primitives of `shared-crypto`.

pub mod flows;
