// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Decision Ledger - Core Library
//!
//! An append-only, hash-linked, proof-of-work sealed record of decisions.
//! Each block carries what was decided, why, and how it scored against a set
//! of ethical principles. Once sealed, any edit to any of that is detectable.
//!
//! There is no network and no consensus. One process owns the chain; the
//! proof of work exists to make rewriting history expensive, not to elect
//! a leader.
//!
//! ## Architecture
//!
//! - **record** - Decision, reasoning and justification payloads.
//! - **crypto** - SHA-256, canonical JSON, difficulty checks.
//! - **pow** - Nonce search that turns a candidate into a sealed block.
//! - **storage** - Blocks, the `Ledger`, whole-chain validation.
//! - **evaluator** - Produces a justification when the caller has none.
//! - **query** - Search, statistics, forensic reports, ethical history.
//! - **coordinator** - Shared, thread-safe ledger with serialized appends.
//! - **config** - Ledger constants and tunables.
//! - **error** - `LedgerError`.
//!
//! ## Quick Start
//!
//! ```
//! use decision_ledger::{DecisionKind, DecisionRecord, Ledger, LedgerConfig, ReasoningRecord};
//!
//! let mut ledger = Ledger::new(LedgerConfig::with_difficulty(1)).unwrap();
//! let decision = DecisionRecord::new("d-1", DecisionKind::Operational, "scale_up", "api")
//!     .with_confidence(0.9);
//! let block = ledger.append(decision, ReasoningRecord::default(), None).unwrap();
//!
//! assert_eq!(block.index, 1);
//! assert!(ledger.validate_chain().valid);
//! ```
//!
//! ## Ground Rules
//!
//! 1. A failed operation leaves the chain exactly as it was.
//! 2. Validation reports every problem it finds, not just the first.
//! 3. Export → import reproduces every block field bit for bit.

pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod evaluator;
pub mod pow;
pub mod query;
pub mod record;
pub mod storage;

pub use config::LedgerConfig;
pub use coordinator::{AppendCoordinator, LedgerEvent};
pub use error::LedgerError;
pub use evaluator::{Evaluator, HeuristicEvaluator};
pub use pow::Sealer;
pub use query::{
    ChainStatistics, ComplianceLevel, EthicalHistoryEntry, ForensicReport, SearchCriteria,
};
pub use record::{
    ComplianceCheck, ComplianceStatus, Conflict, DecisionKind, DecisionRecord,
    EthicalJustification, Evaluation, Evidence, EvidenceKind, LogicStep, Principle,
    ReasoningRecord,
};
pub use storage::{validate_blocks, Block, CandidateBlock, Ledger, ValidationReport};
