//! # Block Structure
//!
//! A block is one sealed, hash-linked entry in the ledger: a decision, the
//! reasoning behind it, its ethical justification, and the linkage and
//! proof-of-work fields that make tampering evident.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  index: u64            (genesis = 0)         │
//! │  timestamp: u64        (Unix ms)             │
//! │  decision: DecisionRecord                    │
//! │  reasoning: ReasoningRecord                  │
//! │  justification: EthicalJustification         │
//! │  previousHash: String  ("0" for genesis)     │
//! │  hash: String          (SHA-256 hex)         │
//! │  nonce: u64                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! CandidateBlock ──seal──▶ Block ──commit──▶ stored in the Ledger
//! ```
//!
//! A [`CandidateBlock`] has no hash and no nonce and cannot be stored. Only
//! the [`Sealer`](crate::pow::Sealer) turns it into a [`Block`].

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{GENESIS_ACTION, GENESIS_DECISION_ID, GENESIS_PREVIOUS_HASH, HASH_ALGORITHM};
use crate::crypto::hash::BlockPreimage;
use crate::error::LedgerError;
use crate::record::{
    ComplianceCheck, ComplianceStatus, DecisionKind, DecisionRecord, EthicalJustification,
    Evaluation, Evidence, EvidenceKind, ReasoningRecord,
};

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A sealed ledger entry.
///
/// Blocks are immutable once stored. The ledger hands out clones or shared
/// references; editing a clone has no effect on the chain (and will fail
/// validation if fed back in).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub decision: DecisionRecord,
    pub reasoning: ReasoningRecord,
    pub justification: EthicalJustification,
    /// Hash of the preceding block; [`GENESIS_PREVIOUS_HASH`] for genesis.
    pub previous_hash: String,
    /// SHA-256 over every other field, nonce included.
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Construct the genesis block.
    ///
    /// Genesis is fully deterministic: timestamp 0, nonce 0, a fixed
    /// initialization decision. It is hashed but not mined, and validation
    /// trusts it by construction (beyond structural checks).
    ///
    /// # Errors
    ///
    /// [`LedgerError::Serialization`] if the payloads fail to canonicalize.
    pub fn genesis() -> Result<Self, LedgerError> {
        let decision = DecisionRecord::new(
            GENESIS_DECISION_ID,
            DecisionKind::Operational,
            GENESIS_ACTION,
            "ledger",
        )
        .with_parameters(json!({ "hashAlgorithm": HASH_ALGORITHM }));

        let mut reasoning = ReasoningRecord::new(
            ["The ledger requires an initial block"],
            ["Ledger initialized"],
            1.0,
        );
        reasoning.push_step(
            "A decision ledger is needed for audit",
            "Every decision must be traceable",
            1.0,
        );
        reasoning.evidence.push(Evidence {
            kind: EvidenceKind::Rule,
            source: "LEDGER".to_string(),
            data: json!("Requirement: full decision traceability"),
            weight: 1.0,
        });

        let justification = EthicalJustification {
            principles: Vec::new(),
            evaluation: Evaluation {
                benefit_score: 1.0,
                harm_score: 0.0,
                fairness_score: 1.0,
                transparency_score: 1.0,
                overall_score: 1.0,
            },
            conflicts: Vec::new(),
            resolution: "No conflicts in genesis block".to_string(),
            compliance: vec![ComplianceCheck {
                rule: "LEDGER".to_string(),
                requirement: "Decision ledger required".to_string(),
                status: ComplianceStatus::Compliant,
                evidence: "Genesis block created".to_string(),
            }],
        };

        let candidate = CandidateBlock {
            index: 0,
            timestamp: 0,
            decision,
            reasoning,
            justification,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };

        let hash = candidate.preimage()?.digest(0);
        Ok(candidate.into_block(hash, 0))
    }

    /// Recompute the hash from the stored fields (excluding `hash`).
    pub fn compute_hash(&self) -> Result<String, LedgerError> {
        let preimage = BlockPreimage::new(
            self.index,
            self.timestamp,
            &self.decision,
            &self.reasoning,
            &self.justification,
            &self.previous_hash,
        )?;
        Ok(preimage.digest(self.nonce))
    }

    /// True when the stored hash matches the content.
    pub fn hash_matches(&self) -> bool {
        matches!(self.compute_hash(), Ok(h) if h == self.hash)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

// ---------------------------------------------------------------------------
// CandidateBlock
// ---------------------------------------------------------------------------

/// A block that has been assembled but not yet sealed.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateBlock {
    pub index: u64,
    pub timestamp: u64,
    pub decision: DecisionRecord,
    pub reasoning: ReasoningRecord,
    pub justification: EthicalJustification,
    pub previous_hash: String,
}

impl CandidateBlock {
    /// Build a candidate extending `parent`, stamped with `timestamp`.
    pub fn extending(
        parent: &Block,
        timestamp: u64,
        decision: DecisionRecord,
        reasoning: ReasoningRecord,
        justification: EthicalJustification,
    ) -> Self {
        Self {
            index: parent.index.saturating_add(1),
            timestamp,
            decision,
            reasoning,
            justification,
            previous_hash: parent.hash.clone(),
        }
    }

    /// Absorb every hashed field except the nonce.
    pub fn preimage(&self) -> Result<BlockPreimage, LedgerError> {
        BlockPreimage::new(
            self.index,
            self.timestamp,
            &self.decision,
            &self.reasoning,
            &self.justification,
            &self.previous_hash,
        )
    }

    /// Attach the sealing result.
    pub(crate) fn into_block(self, hash: String, nonce: u64) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            decision: self.decision,
            reasoning: self.reasoning,
            justification: self.justification,
            previous_hash: self.previous_hash,
            hash,
            nonce,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
