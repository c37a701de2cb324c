//! # Ledger
//!
//! The owned, ordered block sequence and everything that mutates it.
//!
//! ## Append pipeline
//!
//! ```text
//! 1. PREPARE  - resolve the justification (evaluator if absent), check the
//!               payloads and the decision id, build a candidate on the tip
//! 2. SEAL     - bounded proof-of-work over the candidate
//! 3. COMMIT   - re-check index, linkage, hash and difficulty against the
//!               current tip, then push
//! ```
//!
//! [`Ledger::append`] runs all three. The stages are also public so the
//! [`AppendCoordinator`](crate::coordinator::AppendCoordinator) can seal
//! without holding the chain lock. Any failure leaves the chain untouched.
//!
//! ## Invariant
//!
//! `blocks` is never empty: genesis is pushed at construction and
//! [`Ledger::import_chain`] only accepts chains that validated, which
//! requires a genesis block.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::crypto::hash::{canonicalize, meets_difficulty};
use crate::error::LedgerError;
use crate::evaluator::{Evaluator, HeuristicEvaluator};
use crate::pow::Sealer;
use crate::record::{DecisionRecord, EthicalJustification, ReasoningRecord};
use crate::storage::block::{now_millis, Block, CandidateBlock};
use crate::storage::validation::{check_payload, validate_blocks, ValidationReport};

/// Append-only, hash-linked, proof-of-work sealed decision ledger.
pub struct Ledger {
    /// Genesis first, tip last. Never empty.
    blocks: Vec<Block>,
    config: LedgerConfig,
    sealer: Sealer,
    /// Consulted when an append arrives without a justification.
    evaluator: Arc<dyn Evaluator>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("len", &self.blocks.len())
            .field("tip", &self.latest().hash)
            .field("config", &self.config)
            .finish()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block, using the
    /// [`HeuristicEvaluator`] for missing justifications.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        Self::with_evaluator(config, Arc::new(HeuristicEvaluator))
    }

    /// A ledger holding only the genesis block, with a custom evaluator.
    pub fn with_evaluator(
        config: LedgerConfig,
        evaluator: Arc<dyn Evaluator>,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let genesis = Block::genesis()?;
        info!(
            genesis = %genesis.hash,
            difficulty = config.difficulty,
            "ledger initialized"
        );
        Ok(Self {
            blocks: vec![genesis],
            sealer: Sealer::from_config(&config),
            config,
            evaluator,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// The sealer configured for this ledger.
    pub fn sealer(&self) -> Sealer {
        self.sealer
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The chain tip.
    pub fn latest(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block at `index`, if any.
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Read-only view of the whole chain.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    // -----------------------------------------------------------------------
    // Append
    // -----------------------------------------------------------------------

    /// Record a decision as a new sealed block.
    ///
    /// If `justification` is `None` the ledger's evaluator produces one.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ChainAppendRejected`] for malformed payloads, a
    ///   duplicate decision id, or a sealed block that fails its checks.
    /// - [`LedgerError::SealingTimeout`] if the nonce budget runs out.
    ///
    /// The chain is unchanged on every error.
    pub fn append(
        &mut self,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: Option<EthicalJustification>,
    ) -> Result<Block, LedgerError> {
        let candidate = self.prepare(decision, reasoning, justification)?;
        let sealed = self.sealer.seal(candidate)?;
        self.commit(sealed)
    }

    /// Stage 1: build a checked candidate on the current tip, stamped now.
    pub fn prepare(
        &self,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: Option<EthicalJustification>,
    ) -> Result<CandidateBlock, LedgerError> {
        self.prepare_at(decision, reasoning, justification, now_millis())
    }

    /// Stage 1 with an explicit timestamp.
    pub fn prepare_at(
        &self,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: Option<EthicalJustification>,
        timestamp: u64,
    ) -> Result<CandidateBlock, LedgerError> {
        let justification =
            justification.unwrap_or_else(|| self.evaluator.evaluate(&decision, &reasoning));
        let candidate = CandidateBlock::extending(
            self.latest(),
            timestamp,
            decision,
            reasoning,
            justification,
        );

        let payload = candidate
            .decision
            .check()
            .and_then(|_| candidate.reasoning.check())
            .and_then(|_| candidate.justification.check());
        if let Err(reason) = payload {
            return Err(self.reject(candidate.index, format!("malformed payload: {}", reason)));
        }
        if let Some(existing) = self.find_decision(&candidate.decision.id) {
            return Err(self.reject(
                candidate.index,
                format!(
                    "decision id '{}' already recorded in block {}",
                    candidate.decision.id, existing.index
                ),
            ));
        }

        Ok(candidate)
    }

    /// Stage 3: check a sealed block against the current tip and store it.
    ///
    /// Returns a copy of the stored block.
    pub fn commit(&mut self, block: Block) -> Result<Block, LedgerError> {
        self.check_extends_tip(&block)
            .map_err(|reason| self.reject(block.index, reason))?;

        self.blocks.push(block.clone());
        info!(
            index = block.index,
            hash = %block.hash,
            nonce = block.nonce,
            decision = %block.decision.id,
            kind = %block.decision.kind,
            "block appended"
        );
        Ok(block)
    }

    fn check_extends_tip(&self, block: &Block) -> Result<(), String> {
        let tip = self.latest();
        if tip.index.checked_add(1) != Some(block.index) {
            return Err(format!(
                "index {} does not follow tip index {}",
                block.index, tip.index
            ));
        }
        if block.previous_hash != tip.hash {
            return Err("previous hash does not match the chain tip".to_string());
        }
        if !block.hash_matches() {
            return Err("hash does not match block content".to_string());
        }
        if !meets_difficulty(&block.hash, self.config.difficulty) {
            return Err(format!(
                "hash does not meet difficulty {}",
                self.config.difficulty
            ));
        }
        check_payload(block).map_err(|reason| format!("malformed payload: {}", reason))?;
        if let Some(existing) = self.find_decision(&block.decision.id) {
            return Err(format!(
                "decision id '{}' already recorded in block {}",
                block.decision.id, existing.index
            ));
        }
        Ok(())
    }

    fn find_decision(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.decision.id == id)
    }

    fn reject(&self, index: u64, reason: String) -> LedgerError {
        warn!(index, reason = %reason, "block rejected");
        LedgerError::ChainAppendRejected { index, reason }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Validate the whole chain. Read-only and idempotent.
    pub fn validate_chain(&self) -> ValidationReport {
        validate_blocks(&self.blocks, &self.config)
    }

    // -----------------------------------------------------------------------
    // Export / Import
    // -----------------------------------------------------------------------

    /// Canonical, pretty-printed JSON array of every block in chain order.
    pub fn export_chain(&self) -> Result<String, LedgerError> {
        let value = serde_json::to_value(&self.blocks)?;
        Ok(serde_json::to_string_pretty(&canonicalize(&value))?)
    }

    /// Replace the chain with `serialized`, but only if it validates.
    ///
    /// Parse failures and validation failures both come back as an invalid
    /// report; the live chain is retained in either case.
    pub fn import_chain(&mut self, serialized: &str) -> ValidationReport {
        let blocks: Vec<Block> = match serde_json::from_str(serialized) {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!(error = %e, "chain import could not be parsed");
                return ValidationReport::failed(format!("failed to parse chain: {}", e));
            }
        };

        let report = validate_blocks(&blocks, &self.config);
        if report.valid {
            info!(
                blocks = blocks.len(),
                warnings = report.warnings.len(),
                "chain imported"
            );
            self.blocks = blocks;
        } else {
            warn!(
                errors = report.errors.len(),
                "chain import rejected, keeping current chain"
            );
        }
        report
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GENESIS_PREVIOUS_HASH;
    use crate::record::DecisionKind;

    fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::with_difficulty(2)).unwrap()
    }

    fn decision(id: &str, confidence: f64) -> DecisionRecord {
        DecisionRecord::new(id, DecisionKind::Operational, "deploy", "api")
            .with_confidence(confidence)
            .with_alternatives(["a", "b"])
    }

    fn reasoning() -> ReasoningRecord {
        ReasoningRecord::new(["load is high"], ["scale out"], 0.8)
    }

    #[test]
    fn fresh_ledger_holds_valid_genesis() {
        let ledger = ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.latest().index, 0);
        assert_eq!(ledger.latest().previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(ledger.validate_chain().valid);
    }

    #[test]
    fn invalid_config_is_refused() {
        assert!(Ledger::new(LedgerConfig::with_difficulty(65)).is_err());
    }

    #[test]
    fn append_links_and_seals() {
        let mut ledger = ledger();
        let block = ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();

        assert_eq!(block.index, 1);
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.previous_hash, ledger.blocks()[0].hash);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.latest(), &block);
    }

    #[test]
    fn missing_justification_comes_from_evaluator() {
        let mut ledger = ledger();
        let block = ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        assert_eq!(block.justification.principles.len(), 6);
    }

    #[test]
    fn custom_evaluator_is_used() {
        let fixed = Block::genesis().unwrap().justification;
        let evaluator = move |_: &DecisionRecord, _: &ReasoningRecord| fixed.clone();
        let mut ledger =
            Ledger::with_evaluator(LedgerConfig::with_difficulty(1), Arc::new(evaluator)).unwrap();
        let block = ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        assert_eq!(block.justification.resolution, "No conflicts in genesis block");
    }

    #[test]
    fn malformed_justification_is_rejected_without_mutation() {
        let mut ledger = ledger();
        ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        let before = ledger.export_chain().unwrap();

        let mut bad = Block::genesis().unwrap().justification;
        bad.evaluation.overall_score = 7.5;
        let err = ledger
            .append(decision("d-2", 0.9), reasoning(), Some(bad))
            .unwrap_err();

        assert!(matches!(err, LedgerError::ChainAppendRejected { index: 2, .. }));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.export_chain().unwrap(), before);
    }

    #[test]
    fn duplicate_decision_id_is_rejected() {
        let mut ledger = ledger();
        ledger.append(decision("same", 0.9), reasoning(), None).unwrap();
        let err = ledger
            .append(decision("same", 0.5), reasoning(), None)
            .unwrap_err();
        assert!(err.to_string().contains("already recorded in block 1"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn sealing_timeout_leaves_chain_unchanged() {
        let config = LedgerConfig {
            difficulty: 64,
            max_seal_attempts: 5,
            ..LedgerConfig::default()
        };
        let mut ledger = Ledger::new(config).unwrap();
        let err = ledger
            .append(decision("d-1", 0.9), reasoning(), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SealingTimeout { attempts: 5, .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stale_commit_is_rejected() {
        let mut ledger = ledger();
        let stale = ledger
            .prepare(decision("d-1", 0.9), reasoning(), None)
            .unwrap();
        ledger.append(decision("d-2", 0.9), reasoning(), None).unwrap();

        let sealed = ledger.sealer().seal(stale).unwrap();
        let err = ledger.commit(sealed).unwrap_err();
        assert!(matches!(err, LedgerError::ChainAppendRejected { .. }));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn forged_commit_is_rejected() {
        let mut ledger = ledger();
        let candidate = ledger
            .prepare(decision("d-1", 0.9), reasoning(), None)
            .unwrap();
        let mut sealed = ledger.sealer().seal(candidate).unwrap();
        sealed.decision.action = "something else".to_string();

        let err = ledger.commit(sealed).unwrap_err();
        assert!(err.to_string().contains("hash does not match"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn underworked_commit_is_rejected() {
        let mut ledger = ledger();
        let candidate = ledger
            .prepare(decision("d-1", 0.9), reasoning(), None)
            .unwrap();
        // Seal with no work at all; the ledger demands two zero digits.
        let sealed = Sealer::new(0, 1).seal(candidate).unwrap();
        if !meets_difficulty(&sealed.hash, 2) {
            assert!(ledger.commit(sealed).is_err());
            assert_eq!(ledger.len(), 1);
        }
    }

    #[test]
    fn tampering_in_place_is_detected() {
        let mut ledger = ledger();
        ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        assert!(ledger.validate_chain().valid);

        ledger.blocks_mut()[1].decision.action = "rm -rf".to_string();
        let report = ledger.validate_chain();
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.starts_with("block 1: hash mismatch")));
    }

    #[test]
    fn validation_is_idempotent() {
        let mut ledger = ledger();
        ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        let before = ledger.export_chain().unwrap();
        let first = ledger.validate_chain();
        let second = ledger.validate_chain();
        assert_eq!(first, second);
        assert_eq!(ledger.export_chain().unwrap(), before);
    }

    #[test]
    fn export_import_roundtrip() {
        let mut ledger = ledger();
        ledger.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        ledger.append(decision("d-2", 0.123456789), reasoning(), None).unwrap();
        let exported = ledger.export_chain().unwrap();

        let mut other = Ledger::new(LedgerConfig::with_difficulty(2)).unwrap();
        let report = other.import_chain(&exported);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(other.len(), 3);
        assert_eq!(other.blocks(), ledger.blocks());
        assert_eq!(other.export_chain().unwrap(), exported);
    }

    #[test]
    fn tampered_import_keeps_current_chain() {
        let mut source = ledger();
        source.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        let tampered = source.export_chain().unwrap().replace("deploy", "destroy");

        let mut target = ledger();
        target.append(decision("mine", 0.9), reasoning(), None).unwrap();
        let before = target.blocks().to_vec();

        let report = target.import_chain(&tampered);
        assert!(!report.valid);
        assert_eq!(target.blocks(), before.as_slice());
    }

    #[test]
    fn import_with_maximal_indices_is_rejected() {
        let mut source = ledger();
        source.append(decision("d-1", 0.9), reasoning(), None).unwrap();
        let mut blocks = source.blocks().to_vec();
        blocks[1].index = u64::MAX;
        let mut tail = blocks[1].clone();
        tail.decision.id = "d-2".to_string();
        blocks.push(tail);
        let crafted = serde_json::to_string(&blocks).unwrap();

        let mut target = ledger();
        let report = target.import_chain(&crafted);
        assert!(!report.valid);
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn commit_past_maximal_tip_index_is_rejected() {
        let mut ledger = ledger();
        let candidate = ledger
            .prepare(decision("d-1", 0.9), reasoning(), None)
            .unwrap();
        let mut sealed = ledger.sealer().seal(candidate).unwrap();
        sealed.index = u64::MAX;
        let err = ledger.commit(sealed).unwrap_err();
        assert!(err.to_string().contains("does not follow tip index 0"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unparseable_import_is_reported() {
        let mut ledger = ledger();
        let report = ledger.import_chain("{ not a chain");
        assert!(!report.valid);
        assert!(report.errors[0].starts_with("failed to parse chain"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn empty_import_is_rejected() {
        let mut ledger = ledger();
        let report = ledger.import_chain("[]");
        assert!(!report.valid);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn get_out_of_range_is_none() {
        let ledger = ledger();
        assert!(ledger.get(0).is_some());
        assert!(ledger.get(1).is_none());
        assert!(ledger.get(u64::MAX).is_none());
    }
}
