//! Error types for the decision ledger.
//!
//! Every fallible ledger operation returns a [`LedgerError`]. None of them
//! leave the chain partially mutated: a failed append or import means the
//! chain is exactly what it was before the call.

use thiserror::Error;

use crate::storage::validation::ValidationReport;

/// Errors that can occur while growing, loading or configuring a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A candidate block failed payload, linkage, hash or difficulty checks.
    /// The block was discarded and the chain is unchanged.
    #[error("block {index} rejected: {reason}")]
    ChainAppendRejected {
        /// Index the rejected block would have occupied.
        index: u64,
        /// What check failed.
        reason: String,
    },

    /// The nonce search exhausted its attempt budget. Retry with a lower
    /// difficulty or a larger budget; the chain is unchanged.
    #[error("sealing timed out after {attempts} attempts (difficulty {difficulty})")]
    SealingTimeout {
        /// Nonces tried before giving up.
        attempts: u64,
        /// Leading zero hex digits that were required.
        difficulty: u32,
    },

    /// An imported chain did not validate. The live chain was retained.
    #[error("imported chain failed validation: {}", .0.errors.join("; "))]
    ImportValidationFailed(ValidationReport),

    /// The ledger configuration is unusable.
    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),

    /// Encoding or decoding a payload or chain failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A background append task panicked or was cancelled.
    #[error("append worker failed: {0}")]
    WorkerFailed(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
