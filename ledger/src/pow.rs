//! # Proof-of-Work Sealing
//!
//! Turns a [`CandidateBlock`] into a [`Block`] by searching for a nonce whose
//! hash carries at least `difficulty` leading zero hex digits.
//!
//! The search starts at nonce 0 and walks upward. It is CPU-bound and, left
//! alone, unbounded, so every [`Sealer`] carries an attempt budget and gives
//! up with [`LedgerError::SealingTimeout`] once the budget is spent. Sealing
//! never touches the ledger; a timed-out seal simply produces nothing.

use std::time::Instant;

use tracing::debug;

use crate::config::LedgerConfig;
use crate::crypto::hash::meets_difficulty;
use crate::error::LedgerError;
use crate::storage::block::{Block, CandidateBlock};

/// Bounded nonce search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sealer {
    difficulty: u32,
    max_attempts: u64,
}

impl Sealer {
    pub fn new(difficulty: u32, max_attempts: u64) -> Self {
        Self {
            difficulty,
            max_attempts,
        }
    }

    /// Sealer matching a ledger configuration.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.difficulty, config.max_seal_attempts)
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Search for a nonce that satisfies the difficulty predicate.
    ///
    /// # Errors
    ///
    /// [`LedgerError::SealingTimeout`] after `max_attempts` nonces, or a
    /// serialization error if the payloads cannot be canonicalized.
    pub fn seal(&self, candidate: CandidateBlock) -> Result<Block, LedgerError> {
        let started = Instant::now();
        let preimage = candidate.preimage()?;

        for nonce in 0..self.max_attempts {
            let hash = preimage.digest(nonce);
            if meets_difficulty(&hash, self.difficulty) {
                debug!(
                    index = candidate.index,
                    nonce,
                    attempts = nonce + 1,
                    difficulty = self.difficulty,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "block sealed"
                );
                return Ok(candidate.into_block(hash, nonce));
            }
        }

        debug!(
            index = candidate.index,
            attempts = self.max_attempts,
            difficulty = self.difficulty,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sealing budget exhausted"
        );
        Err(LedgerError::SealingTimeout {
            attempts: self.max_attempts,
            difficulty: self.difficulty,
        })
    }

    /// Check a sealed block: stored hash matches content and meets the
    /// difficulty this sealer enforces.
    pub fn verify(&self, block: &Block) -> bool {
        block.hash_matches() && meets_difficulty(&block.hash, self.difficulty)
    }
}
