//! The reasoning payload: premises, a numbered logic chain, conclusions and
//! the evidence behind them. Opaque to the ledger beyond range checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::check_unit;

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceKind {
    /// A measured value.
    Metric,
    /// A recognised pattern.
    Pattern,
    /// Prior outcomes.
    Historical,
    /// An explicit rule or requirement.
    Rule,
}

/// One numbered step in a chain of reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicStep {
    /// 1-based position in the chain.
    pub step: u32,
    /// The claim made at this step.
    pub statement: String,
    /// Why the claim follows.
    pub justification: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// A piece of supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Evidence category.
    pub kind: EvidenceKind,
    /// Origin of the evidence.
    pub source: String,
    /// Raw evidence payload.
    #[serde(default)]
    pub data: Value,
    /// Relative weight assigned by the producer.
    pub weight: f64,
}

/// Full reasoning record for a decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningRecord {
    /// Statements taken as given.
    #[serde(default)]
    pub premises: Vec<String>,
    /// Ordered inference steps.
    #[serde(default)]
    pub logic_chain: Vec<LogicStep>,
    /// What was concluded.
    #[serde(default)]
    pub conclusions: Vec<String>,
    /// Supporting evidence.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    /// Overall confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ReasoningRecord {
    /// Reasoning with the given premises and conclusions and nothing else.
    pub fn new<P, C, S>(premises: P, conclusions: C, confidence: f64) -> Self
    where
        P: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            premises: premises.into_iter().map(Into::into).collect(),
            logic_chain: Vec::new(),
            conclusions: conclusions.into_iter().map(Into::into).collect(),
            evidence: Vec::new(),
            confidence,
        }
    }

    /// Append a step; its number is its 1-based position.
    pub fn push_step(&mut self, statement: impl Into<String>, justification: impl Into<String>, confidence: f64) {
        let step = self.logic_chain.len() as u32 + 1;
        self.logic_chain.push(LogicStep {
            step,
            statement: statement.into(),
            justification: justification.into(),
            confidence,
        });
    }

    /// Structural checks the ledger enforces before sealing.
    pub fn check(&self) -> Result<(), String> {
        check_unit("reasoning.confidence", self.confidence)?;
        for step in &self.logic_chain {
            check_unit(&format!("reasoning.logicChain[{}].confidence", step.step), step.confidence)?;
        }
        for (i, evidence) in self.evidence.iter().enumerate() {
            if !evidence.weight.is_finite() {
                return Err(format!("reasoning.evidence[{}].weight is not finite", i));
            }
        }
        Ok(())
    }
}
