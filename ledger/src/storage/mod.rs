//! # Storage Module
//!
//! The chain itself: blocks, the in-memory ledger that owns them, and the
//! validator that audits them.
//!
//! ## Architecture
//!
//! ```text
//! block.rs       - Block / CandidateBlock, genesis, hash recomputation
//! chain.rs       - Ledger: append (prepare → seal → commit), export, import
//! validation.rs  - whole-chain audit producing a ValidationReport
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! DecisionRecord + ReasoningRecord (+ EthicalJustification)
//!        ↓ prepare
//!   CandidateBlock ── Sealer::seal ──→ Block ── commit ──→ Ledger
//!                                                            ↓
//!                                          export_chain → JSON → import_chain
//! ```
//!
//! Nothing is persisted here. Export produces a canonical JSON array and the
//! caller decides where it goes; import refuses anything that does not
//! validate end to end.

pub mod block;
pub mod chain;
pub mod validation;

pub use block::{Block, CandidateBlock};
pub use chain::Ledger;
pub use validation::{validate_blocks, ValidationReport};
