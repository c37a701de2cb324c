//! # Read-Only Queries
//!
//! Linear scans over a [`Ledger`]: filtered search, aggregate statistics,
//! forensic dumps of single blocks and the per-decision ethical history.
//! None of these mutate anything. All of them skip genesis except
//! [`Ledger::forensic_report`], which will happily describe block 0.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::record::DecisionKind;
use crate::storage::block::Block;
use crate::storage::chain::Ledger;

// ---------------------------------------------------------------------------
// SearchCriteria
// ---------------------------------------------------------------------------

/// Conjunctive search filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub kind: Option<DecisionKind>,
    /// Inclusive lower bound on decision confidence.
    pub min_confidence: Option<f64>,
    /// Inclusive lower bound on block timestamp (Unix ms).
    pub start_time: Option<u64>,
    /// Inclusive upper bound on block timestamp (Unix ms).
    pub end_time: Option<u64>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: DecisionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.min_confidence = Some(confidence);
        self
    }

    pub fn between(mut self, start: u64, end: u64) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// True when `block` passes every set criterion. Genesis never matches.
    pub fn matches(&self, block: &Block) -> bool {
        if block.is_genesis() {
            return false;
        }
        if self.kind.is_some_and(|k| block.decision.kind != k) {
            return false;
        }
        if self
            .min_confidence
            .is_some_and(|min| block.decision.confidence < min)
        {
            return false;
        }
        if self.start_time.is_some_and(|t| block.timestamp < t) {
            return false;
        }
        if self.end_time.is_some_and(|t| block.timestamp > t) {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// ChainStatistics
// ---------------------------------------------------------------------------

/// Aggregates over the non-genesis blocks of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatistics {
    /// Genesis included.
    pub total_blocks: usize,
    /// `total_blocks - 1`.
    pub total_decisions: usize,
    /// 0 when there are no decisions.
    pub average_confidence: f64,
    /// Mean `overallScore`; 0 when there are no decisions.
    pub average_justification_score: f64,
    /// Whether the chain currently validates.
    pub chain_integrity: bool,
}

// ---------------------------------------------------------------------------
// Ethical history
// ---------------------------------------------------------------------------

/// Whether every compliance check of a justification passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    Full,
    Partial,
}

/// One line of the ethical history: a decision and how it was justified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthicalHistoryEntry {
    pub index: u64,
    pub timestamp: u64,
    pub action: String,
    pub overall_score: f64,
    pub conflicts: usize,
    pub compliance: ComplianceLevel,
}

// ---------------------------------------------------------------------------
// ForensicReport
// ---------------------------------------------------------------------------

/// Full human-readable account of one block. Render it with `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForensicReport {
    pub block: Block,
}

fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

fn iso_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| format!("{} ms", ms))
}

const RULE: &str = "----------------------------------------------------------------";

impl fmt::Display for ForensicReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.block;
        let d = &b.decision;
        let r = &b.reasoning;
        let j = &b.justification;
        let e = &j.evaluation;

        writeln!(f, "================================================================")?;
        writeln!(f, "                 DECISION FORENSIC REPORT")?;
        writeln!(f, "================================================================")?;
        writeln!(f)?;
        writeln!(f, "METADATA")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Block:         #{}", b.index)?;
        writeln!(f, "Timestamp:     {}", iso_timestamp(b.timestamp))?;
        writeln!(f, "Hash:          {}", b.hash)?;
        writeln!(f, "Previous hash: {}", b.previous_hash)?;
        writeln!(f, "Nonce:         {}", b.nonce)?;
        writeln!(f)?;

        writeln!(f, "DECISION")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "ID:            {}", d.id)?;
        writeln!(f, "Kind:          {}", d.kind)?;
        writeln!(f, "Action:        {}", d.action)?;
        writeln!(f, "Target:        {}", d.target)?;
        writeln!(f, "Confidence:    {}", percent(d.confidence))?;
        if !d.parameters.is_null() {
            writeln!(f, "Parameters:    {}", d.parameters)?;
        }
        writeln!(f, "Alternatives considered: {}", d.alternatives.len())?;
        for alternative in &d.alternatives {
            writeln!(f, "  - {}", alternative)?;
        }
        writeln!(f)?;

        writeln!(f, "REASONING")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Premises:")?;
        for premise in &r.premises {
            writeln!(f, "  * {}", premise)?;
        }
        writeln!(f, "Logic chain:")?;
        for step in &r.logic_chain {
            writeln!(
                f,
                "  {}. {} ({:.0}%) because {}",
                step.step,
                step.statement,
                step.confidence * 100.0,
                step.justification
            )?;
        }
        writeln!(f, "Conclusions:")?;
        for conclusion in &r.conclusions {
            writeln!(f, "  + {}", conclusion)?;
        }
        writeln!(f, "Evidence:")?;
        for evidence in &r.evidence {
            writeln!(
                f,
                "  [{:?}] {} (weight {}): {}",
                evidence.kind, evidence.source, evidence.weight, evidence.data
            )?;
        }
        writeln!(f, "Reasoning confidence: {}", percent(r.confidence))?;
        writeln!(f)?;

        writeln!(f, "ETHICAL JUSTIFICATION")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Benefit:       {}", percent(e.benefit_score))?;
        writeln!(f, "Harm:          {}", percent(e.harm_score))?;
        writeln!(f, "Fairness:      {}", percent(e.fairness_score))?;
        writeln!(f, "Transparency:  {}", percent(e.transparency_score))?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "OVERALL SCORE: {}", percent(e.overall_score))?;
        writeln!(f)?;
        writeln!(f, "Principles:")?;
        for p in &j.principles {
            let mark = if p.satisfied { "yes" } else { "no " };
            writeln!(f, "  [{}] {} (weight {})", mark, p.name, p.weight)?;
        }
        if j.conflicts.is_empty() {
            writeln!(f, "Conflicts:     none")?;
        } else {
            writeln!(f, "Conflicts:")?;
            for c in &j.conflicts {
                writeln!(
                    f,
                    "  {} vs {}: {} -> {}",
                    c.principle_a, c.principle_b, c.description, c.resolution
                )?;
            }
        }
        if !j.resolution.is_empty() {
            writeln!(f, "Resolution:    {}", j.resolution)?;
        }
        writeln!(f, "Compliance:")?;
        for c in &j.compliance {
            writeln!(f, "  [{}] {}: {}", c.status, c.rule, c.requirement)?;
        }
        write!(f, "================================================================")
    }
}

// ---------------------------------------------------------------------------
// Ledger queries
// ---------------------------------------------------------------------------

impl Ledger {
    /// Every non-genesis block matching `criteria`, in chain order.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<Block> {
        self.blocks()
            .iter()
            .filter(|b| criteria.matches(b))
            .cloned()
            .collect()
    }

    /// Aggregate statistics. Runs a full validation for `chain_integrity`.
    pub fn statistics(&self) -> ChainStatistics {
        let decisions = &self.blocks()[1..];
        let count = decisions.len();
        let (confidence, score) = decisions.iter().fold((0.0, 0.0), |(c, s), b| {
            (
                c + b.decision.confidence,
                s + b.justification.overall_score(),
            )
        });
        let mean = |total: f64| if count == 0 { 0.0 } else { total / count as f64 };

        ChainStatistics {
            total_blocks: self.len(),
            total_decisions: count,
            average_confidence: mean(confidence),
            average_justification_score: mean(score),
            chain_integrity: self.validate_chain().valid,
        }
    }

    /// Forensic dump of the block at `index`; `None` when out of range.
    pub fn forensic_report(&self, index: u64) -> Option<ForensicReport> {
        self.get(index).map(|block| ForensicReport {
            block: block.clone(),
        })
    }

    /// Score, conflict count and compliance level of every decision.
    pub fn ethical_history(&self) -> Vec<EthicalHistoryEntry> {
        self.blocks()[1..]
            .iter()
            .map(|b| EthicalHistoryEntry {
                index: b.index,
                timestamp: b.timestamp,
                action: b.decision.action.clone(),
                overall_score: b.justification.overall_score(),
                conflicts: b.justification.conflicts.len(),
                compliance: if b.justification.fully_compliant() {
                    ComplianceLevel::Full
                } else {
                    ComplianceLevel::Partial
                },
            })
            .collect()
    }
}
