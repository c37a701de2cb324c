//! # Cryptographic Primitives
//!
//! Hashing and canonical encoding for ledger blocks. SHA-256 via the `sha2`
//! crate; nothing here is hand-rolled.

pub mod hash;

pub use hash::{
    canonical_json, canonicalize, leading_zero_digits, meets_difficulty, sha256, sha256_hex,
    BlockPreimage,
};
