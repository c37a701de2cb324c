//! # Justification Evaluators
//!
//! The ledger does not decide whether a decision is ethical. When a caller
//! appends without a justification, the ledger asks its [`Evaluator`] for
//! one and records whatever comes back (after range checks).
//!
//! [`HeuristicEvaluator`] is the default. It scores a decision from its kind,
//! confidence, alternatives and action text:
//!
//! ```text
//! overall = 0.3 * benefit + 0.3 * (1 - harm) + 0.2 * fairness + 0.2 * transparency
//! ```
//!
//! Swap it for anything implementing [`Evaluator`], including a plain
//! closure.

use crate::record::{
    ComplianceCheck, ComplianceStatus, Conflict, DecisionKind, DecisionRecord,
    EthicalJustification, Evaluation, Principle, ReasoningRecord,
};

/// Produces an [`EthicalJustification`] for a decision and its reasoning.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, decision: &DecisionRecord, reasoning: &ReasoningRecord)
        -> EthicalJustification;
}

impl<F> Evaluator for F
where
    F: Fn(&DecisionRecord, &ReasoningRecord) -> EthicalJustification + Send + Sync,
{
    fn evaluate(
        &self,
        decision: &DecisionRecord,
        reasoning: &ReasoningRecord,
    ) -> EthicalJustification {
        self(decision, reasoning)
    }
}

// ---------------------------------------------------------------------------
// HeuristicEvaluator
// ---------------------------------------------------------------------------

const COHERENCE: &str = "Preserve systemic coherence";
const ECOSYSTEM: &str = "Ecosystem benefit over individual component";
const TRANSPARENCY: &str = "Transparency in decision processes";
const AUTONOMY: &str = "Respect the autonomy of other agents";
const HARM_PREVENTION: &str = "Prevent systemic harm";
const DIVERSITY: &str = "Preserve computational diversity";

/// Principles weighed by [`HeuristicEvaluator`], in evaluation order.
pub const PRINCIPLES: [&str; 6] = [
    COHERENCE,
    ECOSYSTEM,
    TRANSPARENCY,
    AUTONOMY,
    HARM_PREVENTION,
    DIVERSITY,
];

/// `SYSTEM_IMPACT` compliance requires an overall score above this.
pub const COMPLIANCE_SCORE_FLOOR: f64 = 0.6;

/// Rule-of-thumb scoring of a decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    fn principle_satisfied(principle: &str, decision: &DecisionRecord) -> bool {
        match principle {
            COHERENCE => decision.kind != DecisionKind::Emergency,
            ECOSYSTEM => decision.confidence > 0.7,
            TRANSPARENCY => !decision.alternatives.is_empty(),
            AUTONOMY => !decision.action.to_lowercase().contains("override"),
            HARM_PREVENTION => {
                decision.kind == DecisionKind::Emergency || decision.confidence > 0.6
            }
            DIVERSITY => decision.alternatives.len() > 1,
            _ => true,
        }
    }

    fn benefit(decision: &DecisionRecord) -> f64 {
        let bonus = match decision.kind {
            DecisionKind::Strategic => 0.1,
            DecisionKind::Ethical => 0.15,
            _ => 0.0,
        };
        (decision.confidence + bonus).min(1.0)
    }

    fn harm(decision: &DecisionRecord) -> f64 {
        let mut score = 0.0;
        if decision.kind == DecisionKind::Emergency {
            score += 0.3;
        }
        if decision.confidence < 0.5 {
            score += 0.2;
        }
        if decision.alternatives.is_empty() {
            score += 0.1;
        }
        f64::min(score, 1.0)
    }

    fn fairness(decision: &DecisionRecord) -> f64 {
        let breadth = (decision.alternatives.len() as f64 / 5.0).min(1.0);
        let kind = if decision.kind == DecisionKind::Ethical {
            1.0
        } else {
            0.7
        };
        (breadth + kind) / 2.0
    }
}

impl Evaluator for HeuristicEvaluator {
    fn evaluate(
        &self,
        decision: &DecisionRecord,
        _reasoning: &ReasoningRecord,
    ) -> EthicalJustification {
        let principles = PRINCIPLES
            .iter()
            .map(|name| Principle {
                name: name.to_string(),
                description: name.to_string(),
                weight: 1.0,
                satisfied: Self::principle_satisfied(name, decision),
            })
            .collect();

        let benefit_score = Self::benefit(decision);
        let harm_score = Self::harm(decision);
        let fairness_score = Self::fairness(decision);
        // Confidence stands in for transparency.
        let transparency_score = decision.confidence;
        let overall_score = benefit_score * 0.3
            + (1.0 - harm_score) * 0.3
            + fairness_score * 0.2
            + transparency_score * 0.2;

        let mut conflicts = Vec::new();
        if decision.kind == DecisionKind::Emergency {
            conflicts.push(Conflict {
                principle_a: TRANSPARENCY.to_string(),
                principle_b: HARM_PREVENTION.to_string(),
                description: "Emergency action may require a fast decision without full transparency"
                    .to_string(),
                resolution: "Prioritise harm prevention, document after the fact".to_string(),
            });
        }

        let compliance = vec![
            ComplianceCheck {
                rule: "TRACEABILITY".to_string(),
                requirement: "All decisions must be traceable".to_string(),
                status: ComplianceStatus::Compliant,
                evidence: "Decision recorded in ledger".to_string(),
            },
            ComplianceCheck {
                rule: "SYSTEM_IMPACT".to_string(),
                requirement: "Decisions must consider system-wide impact".to_string(),
                status: if overall_score > COMPLIANCE_SCORE_FLOOR {
                    ComplianceStatus::Compliant
                } else {
                    ComplianceStatus::NonCompliant
                },
                evidence: format!("Ethical score: {:.2}", overall_score),
            },
        ];

        let resolution = if conflicts.is_empty() {
            "No ethical conflicts detected"
        } else {
            "Conflicts resolved through weighted prioritisation"
        };

        EthicalJustification {
            principles,
            evaluation: Evaluation {
                benefit_score,
                harm_score,
                fairness_score,
                transparency_score,
                overall_score,
            },
            conflicts,
            resolution: resolution.to_string(),
            compliance,
        }
    }
}
