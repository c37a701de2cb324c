//! Whole-chain validation.
//!
//! [`validate_blocks`] walks a block sequence and collects every finding
//! instead of stopping at the first. Errors make the chain invalid;
//! warnings are advisory and never affect `valid`.
//!
//! | Check                                         | Severity |
//! |-----------------------------------------------|----------|
//! | genesis index 0 / sentinel previous hash      | error    |
//! | index continuity                              | error    |
//! | stored hash equals recomputed hash            | error    |
//! | previous hash equals predecessor's hash       | error    |
//! | hash meets difficulty (non-genesis)           | error    |
//! | payload scores finite and in `[0, 1]`         | error    |
//! | decision ids unique                           | error    |
//! | timestamp lower than predecessor's            | warning  |
//! | justification `overallScore` below threshold  | warning  |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{LedgerConfig, GENESIS_PREVIOUS_HASH};
use crate::crypto::hash::meets_difficulty;
use crate::error::LedgerError;
use crate::storage::block::Block;

/// Outcome of validating a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// `valid` is derived from whether any errors were found.
    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// A report carrying a single error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::from_findings(vec![error.into()], Vec::new())
    }

    /// Turn an invalid report into [`LedgerError::ImportValidationFailed`]
    /// for callers that prefer `?`.
    pub fn into_result(self) -> Result<Self, LedgerError> {
        if self.valid {
            Ok(self)
        } else {
            Err(LedgerError::ImportValidationFailed(self))
        }
    }
}

/// Check payload well-formedness for one block.
pub(crate) fn check_payload(block: &Block) -> Result<(), String> {
    block.decision.check()?;
    block.reasoning.check()?;
    block.justification.check()
}

/// Validate `blocks` against the invariants of a ledger configured by
/// `config`. Read-only and deterministic.
pub fn validate_blocks(blocks: &[Block], config: &LedgerConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(genesis) = blocks.first() else {
        return ValidationReport::failed("chain is empty: a genesis block is required");
    };

    // Genesis is trusted by construction; only its structure is checked.
    if genesis.index != 0 {
        errors.push(format!("block 0: genesis index is {}, expected 0", genesis.index));
    }
    if genesis.previous_hash != GENESIS_PREVIOUS_HASH {
        errors.push(format!(
            "block 0: genesis previous hash is '{}', expected '{}'",
            genesis.previous_hash, GENESIS_PREVIOUS_HASH
        ));
    }
    if !genesis.hash_matches() {
        errors.push("block 0: hash mismatch".to_string());
    }
    if let Err(reason) = check_payload(genesis) {
        errors.push(format!("block 0: malformed payload: {}", reason));
    }

    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    seen_ids.insert(genesis.decision.id.as_str(), 0);

    for (i, pair) in blocks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let position = i + 1;

        if previous.index.checked_add(1) != Some(current.index) {
            errors.push(format!(
                "block {}: index {} does not follow {}",
                position, current.index, previous.index
            ));
        }

        match current.compute_hash() {
            Ok(computed) if computed == current.hash => {}
            Ok(computed) => errors.push(format!(
                "block {}: hash mismatch (stored={}, computed={})",
                position, current.hash, computed
            )),
            Err(e) => errors.push(format!("block {}: hash could not be computed: {}", position, e)),
        }

        if current.previous_hash != previous.hash {
            errors.push(format!(
                "block {}: previous hash does not match block {}",
                position,
                position - 1
            ));
        }

        if !meets_difficulty(&current.hash, config.difficulty) {
            errors.push(format!(
                "block {}: hash does not meet difficulty {}",
                position, config.difficulty
            ));
        }

        if let Err(reason) = check_payload(current) {
            errors.push(format!("block {}: malformed payload: {}", position, reason));
        }

        if let Some(first) = seen_ids.insert(current.decision.id.as_str(), position) {
            errors.push(format!(
                "block {}: duplicate decision id '{}' (first used in block {})",
                position, current.decision.id, first
            ));
        }

        if current.timestamp < previous.timestamp {
            warnings.push(format!(
                "block {}: timestamp {} precedes previous block timestamp {}",
                position, current.timestamp, previous.timestamp
            ));
        }

        let score = current.justification.overall_score();
        if score < config.low_score_threshold {
            warnings.push(format!(
                "block {}: low justification score {} (threshold {})",
                position, score, config.low_score_threshold
            ));
        }
    }

    ValidationReport::from_findings(errors, warnings)
}
