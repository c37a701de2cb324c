//! The ethical justification payload.
//!
//! The ledger reads `evaluation.overallScore` for statistics and low-score
//! warnings; the rest is recorded as supplied by the evaluator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::check_unit;

/// A principle weighed when justifying a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principle {
    /// Short name.
    pub name: String,
    /// Longer statement of the principle.
    #[serde(default)]
    pub description: String,
    /// Relative weight.
    pub weight: f64,
    /// Whether the decision satisfies it.
    pub satisfied: bool,
}

/// Scores in `[0, 1]`. Higher is better except `harm_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub benefit_score: f64,
    pub harm_score: f64,
    pub fairness_score: f64,
    pub transparency_score: f64,
    pub overall_score: f64,
}

/// Two principles pulling in different directions, and how that was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub principle_a: String,
    pub principle_b: String,
    pub description: String,
    pub resolution: String,
}

/// Outcome of a compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Uncertain,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "COMPLIANT"),
            Self::NonCompliant => write!(f, "NON_COMPLIANT"),
            Self::Uncertain => write!(f, "UNCERTAIN"),
        }
    }
}

/// A single rule checked against the decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub rule: String,
    pub requirement: String,
    pub status: ComplianceStatus,
    pub evidence: String,
}

/// Ethical justification for a decision, as produced by an
/// [`Evaluator`](crate::evaluator::Evaluator) or supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthicalJustification {
    #[serde(default)]
    pub principles: Vec<Principle>,
    pub evaluation: Evaluation,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    /// Summary of how conflicts were resolved.
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub compliance: Vec<ComplianceCheck>,
}

impl EthicalJustification {
    /// The score read by statistics and validation warnings.
    pub fn overall_score(&self) -> f64 {
        self.evaluation.overall_score
    }

    /// True when every compliance check passed (vacuously true when empty).
    pub fn fully_compliant(&self) -> bool {
        self.compliance
            .iter()
            .all(|c| c.status == ComplianceStatus::Compliant)
    }

    /// Structural checks the ledger enforces before sealing.
    pub fn check(&self) -> Result<(), String> {
        let e = &self.evaluation;
        check_unit("evaluation.benefitScore", e.benefit_score)?;
        check_unit("evaluation.harmScore", e.harm_score)?;
        check_unit("evaluation.fairnessScore", e.fairness_score)?;
        check_unit("evaluation.transparencyScore", e.transparency_score)?;
        check_unit("evaluation.overallScore", e.overall_score)?;
        for p in &self.principles {
            if !p.weight.is_finite() {
                return Err(format!("principle '{}' has a non-finite weight", p.name));
            }
        }
        Ok(())
    }
}
