//! # Record Payloads
//!
//! The three payloads a block carries:
//!
//! ```text
//! decision.rs       - what was decided (kind, action, target, confidence)
//! reasoning.rs      - premises, logic chain, conclusions, evidence
//! justification.rs  - principles, scores, conflicts, compliance
//! ```
//!
//! The ledger treats them as opaque except for the few fields it reads for
//! search, statistics and warnings. It does check that every score and
//! confidence is a finite number in `[0, 1]` before sealing, because a NaN
//! cannot survive a JSON round trip and would make the block unverifiable.

pub mod decision;
pub mod justification;
pub mod reasoning;

pub use decision::{DecisionKind, DecisionRecord};
pub use justification::{
    ComplianceCheck, ComplianceStatus, Conflict, EthicalJustification, Evaluation, Principle,
};
pub use reasoning::{Evidence, EvidenceKind, LogicStep, ReasoningRecord};

/// Ensure `value` is finite and within `[0, 1]`.
pub(crate) fn check_unit(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 1], got {}", field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(check_unit("x", 0.0).is_ok());
        assert!(check_unit("x", 1.0).is_ok());
        assert!(check_unit("x", -0.0001).is_err());
        assert!(check_unit("x", f64::INFINITY).is_err());
    }
}
