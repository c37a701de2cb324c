//! # Ledger Configuration & Constants
//!
//! Every magic number in the ledger lives here. Sealing difficulty, the
//! attempt budget, the low-score warning threshold and the genesis sentinel
//! all change what a "valid chain" means, so they are kept in one place and
//! validated before a ledger is built on top of them.

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Chain Constants
// ---------------------------------------------------------------------------

/// `previousHash` carried by the genesis block. Nothing precedes it, so it
/// points at a fixed sentinel instead of a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Decision id reserved for the genesis block.
pub const GENESIS_DECISION_ID: &str = "genesis";

/// Action recorded by the genesis decision.
pub const GENESIS_ACTION: &str = "INITIALIZE_LEDGER";

/// The hash function behind every block digest.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Hex digits in a SHA-256 digest. Also the hardest difficulty that can
/// ever be satisfied.
pub const MAX_DIFFICULTY: u32 = 64;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default number of leading zero hex digits a sealed hash must carry.
/// Four digits means ~65k hashes per block on average: noticeable, not painful.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Default nonce budget per seal. At difficulty 4 the expected work is
/// 16^4 = 65_536 attempts, so this leaves more than two orders of magnitude
/// of headroom before a seal is declared timed out.
pub const DEFAULT_MAX_SEAL_ATTEMPTS: u64 = 10_000_000;

/// Justifications scoring below this `overallScore` produce a validation
/// warning (never an error).
pub const DEFAULT_LOW_SCORE_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Tunable parameters for a [`Ledger`](crate::storage::Ledger).
///
/// Defaults match a local audit trail. Tests usually drop `difficulty` to
/// 1 or 2 so sealing stays in the microsecond range.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Leading zero hex digits required of every sealed block hash.
    pub difficulty: u32,

    /// Maximum nonces tried before sealing fails with
    /// [`LedgerError::SealingTimeout`].
    pub max_seal_attempts: u64,

    /// `overallScore` below which validation emits a warning.
    pub low_score_threshold: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            max_seal_attempts: DEFAULT_MAX_SEAL_ATTEMPTS,
            low_score_threshold: DEFAULT_LOW_SCORE_THRESHOLD,
        }
    }
}

impl LedgerConfig {
    /// Same defaults, different difficulty.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Reject configurations that could never seal or never warn sensibly.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty {} exceeds the {} hex digits of a {} digest",
                self.difficulty, MAX_DIFFICULTY, HASH_ALGORITHM
            )));
        }
        if self.max_seal_attempts == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_seal_attempts must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.low_score_threshold) {
            return Err(LedgerError::InvalidConfig(format!(
                "low_score_threshold {} is outside [0, 1]",
                self.low_score_threshold
            )));
        }
        Ok(())
    }
}
