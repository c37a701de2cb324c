//! The decision payload carried by every block.
//!
//! The ledger reads only `id`, `kind` and `confidence` (for uniqueness,
//! search and statistics). Everything else is recorded verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::check_unit;

// ---------------------------------------------------------------------------
// DecisionKind
// ---------------------------------------------------------------------------

/// Category of a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    /// Routine, day-to-day operation.
    Operational,
    /// Long-horizon planning choice.
    Strategic,
    /// A decision whose main content is an ethical trade-off.
    Ethical,
    /// Taken under time pressure to prevent harm.
    Emergency,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operational => write!(f, "OPERATIONAL"),
            Self::Strategic => write!(f, "STRATEGIC"),
            Self::Ethical => write!(f, "ETHICAL"),
            Self::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

impl std::str::FromStr for DecisionKind {
    type Err = String;

    /// Case-insensitive; accepts `operational` as well as `OPERATIONAL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPERATIONAL" => Ok(Self::Operational),
            "STRATEGIC" => Ok(Self::Strategic),
            "ETHICAL" => Ok(Self::Ethical),
            "EMERGENCY" => Ok(Self::Emergency),
            other => Err(format!("unknown decision kind: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionRecord
// ---------------------------------------------------------------------------

/// What was decided, against what, and with how much confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    /// Unique within a chain.
    pub id: String,
    /// Decision category.
    pub kind: DecisionKind,
    /// What was done.
    pub action: String,
    /// What it was done to.
    pub target: String,
    /// Free-form structured parameters. Opaque to the ledger.
    #[serde(default)]
    pub parameters: Value,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Alternatives that were considered, in the order they were weighed.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl DecisionRecord {
    /// A decision with no parameters, no alternatives and full confidence.
    pub fn new(
        id: impl Into<String>,
        kind: DecisionKind,
        action: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            action: action.into(),
            target: target.into(),
            parameters: Value::Null,
            confidence: 1.0,
            alternatives: Vec::new(),
        }
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the parameters payload.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the considered alternatives.
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    /// Structural checks the ledger enforces before sealing.
    pub fn check(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("decision id must not be empty".to_string());
        }
        check_unit("decision.confidence", self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display_matches_wire_name() {
        for kind in [
            DecisionKind::Operational,
            DecisionKind::Strategic,
            DecisionKind::Ethical,
            DecisionKind::Emergency,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(
            "emergency".parse::<DecisionKind>().unwrap(),
            DecisionKind::Emergency
        );
        assert!("tactical".parse::<DecisionKind>().is_err());
    }

    #[test]
    fn builder_sets_fields() {
        let d = DecisionRecord::new("d-1", DecisionKind::Strategic, "scale", "cluster")
            .with_confidence(0.75)
            .with_alternatives(["wait", "shrink"]);
        assert_eq!(d.confidence, 0.75);
        assert_eq!(d.alternatives, vec!["wait", "shrink"]);
        assert!(d.parameters.is_null());
    }

    #[test]
    fn check_rejects_out_of_range_confidence() {
        let d = DecisionRecord::new("d", DecisionKind::Operational, "a", "t").with_confidence(1.2);
        assert!(d.check().is_err());
    }

    #[test]
    fn check_rejects_blank_id() {
        let d = DecisionRecord::new("  ", DecisionKind::Operational, "a", "t");
        assert!(d.check().is_err());
    }

    #[test]
    fn missing_optional_fields_default_on_decode() {
        let json = r#"{"id":"x","kind":"ETHICAL","action":"a","target":"t","confidence":0.5}"#;
        let d: DecisionRecord = serde_json::from_str(json).unwrap();
        assert!(d.alternatives.is_empty());
        assert!(d.parameters.is_null());
    }
}
