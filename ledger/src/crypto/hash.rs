//! # Hashing & Canonical Encoding
//!
//! Everything that turns a block into a digest lives here. The contract is
//! determinism: the same block content always produces the same hex string,
//! no matter how its payloads were assembled.
//!
//! ## Canonical form
//!
//! Payloads are converted to a `serde_json::Value`, every object has its keys
//! sorted recursively, arrays keep their order, and the result is written as
//! compact JSON. Two payloads that differ only in map construction order
//! therefore canonicalize to the same bytes.
//!
//! ## Block preimage
//!
//! ```text
//! index | timestamp | canon(decision) | canon(reasoning) | canon(justification) | previousHash | nonce
//! ```
//!
//! Fields are joined with `|` and hashed with SHA-256. Everything up to the
//! nonce is fixed while sealing, so [`BlockPreimage`] absorbs that prefix once
//! and clones the hasher state for each nonce it tries.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::LedgerError;
use crate::record::{DecisionRecord, EthicalJustification, ReasoningRecord};

/// Separator between preimage fields.
const FIELD_SEPARATOR: &[u8] = b"|";

/// Compute the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 as a lowercase hex string.
///
/// # Example
///
/// ```
/// use decision_ledger::crypto::sha256_hex;
///
/// assert_eq!(sha256_hex(b"").len(), 64);
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Recursively sort object keys. Arrays keep their order; scalars are cloned.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize `value` to canonical compact JSON.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, LedgerError> {
    let raw = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&canonicalize(&raw))?)
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_zero_digits(hash_hex: &str) -> usize {
    hash_hex.bytes().take_while(|b| *b == b'0').count()
}

/// The difficulty predicate: at least `difficulty` leading zero hex digits.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    leading_zero_digits(hash_hex) >= difficulty as usize
}

// ---------------------------------------------------------------------------
// BlockPreimage
// ---------------------------------------------------------------------------

/// A block's hash input with everything but the nonce already absorbed.
#[derive(Clone)]
pub struct BlockPreimage {
    prefix: Sha256,
}

impl BlockPreimage {
    /// Absorb every hashed field except the nonce.
    pub fn new(
        index: u64,
        timestamp: u64,
        decision: &DecisionRecord,
        reasoning: &ReasoningRecord,
        justification: &EthicalJustification,
        previous_hash: &str,
    ) -> Result<Self, LedgerError> {
        let mut prefix = Sha256::new();
        for field in [
            index.to_string(),
            timestamp.to_string(),
            canonical_json(decision)?,
            canonical_json(reasoning)?,
            canonical_json(justification)?,
            previous_hash.to_string(),
        ] {
            prefix.update(field.as_bytes());
            prefix.update(FIELD_SEPARATOR);
        }
        Ok(Self { prefix })
    }

    /// Finish the hash with `nonce` and return it as lowercase hex.
    pub fn digest(&self, nonce: u64) -> String {
        let mut hasher = self.prefix.clone();
        hasher.update(nonce.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}
