//! # CLI Interface
//!
//! Defines the command-line argument structure for `decision-ledger` using
//! `clap` derive. Every subcommand operates on a single JSON ledger file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use decision_ledger::config::{DEFAULT_DIFFICULTY, DEFAULT_MAX_SEAL_ATTEMPTS};
use decision_ledger::{DecisionKind, LedgerConfig, SearchCriteria};

/// Tamper-evident ledger of audited decisions.
///
/// Records decisions with their reasoning and ethical justification in a
/// hash-linked, proof-of-work sealed chain stored as a JSON file. Results
/// are printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "decision-ledger",
    about = "Tamper-evident ledger of audited decisions",
    version,
    propagate_version = true
)]
pub struct LedgerCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the ledger file.
    #[arg(
        long,
        short = 'f',
        global = true,
        env = "LEDGER_FILE",
        default_value = "ledger.json"
    )]
    pub file: PathBuf,

    /// Required leading zero hex digits for sealed blocks.
    ///
    /// Must match the difficulty the file was written with, otherwise
    /// loading fails validation.
    #[arg(long, global = true, env = "LEDGER_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: u32,

    /// Nonces to try before an append gives up.
    #[arg(long, global = true, env = "LEDGER_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_SEAL_ATTEMPTS)]
    pub max_attempts: u64,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "LEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl GlobalArgs {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            difficulty: self.difficulty,
            max_seal_attempts: self.max_attempts,
            ..LedgerConfig::default()
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new ledger file holding only the genesis block.
    Init(InitArgs),
    /// Seal a decision into the ledger.
    Append(AppendArgs),
    /// Audit the whole chain and print the validation report.
    Validate,
    /// Print aggregate statistics.
    Stats,
    /// Print blocks matching the given filters.
    Search(SearchArgs),
    /// Print a forensic report for one block.
    Report(ReportArgs),
    /// Print the ethical history of every decision.
    History,
    /// Write the canonical chain JSON to a file or stdout.
    Export(ExportArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing ledger file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `append` subcommand.
#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Decision id. A random UUID when omitted.
    #[arg(long)]
    pub id: Option<String>,

    /// Decision kind: operational, strategic, ethical or emergency.
    #[arg(long, default_value = "operational")]
    pub kind: DecisionKind,

    /// What was decided.
    #[arg(long)]
    pub action: String,

    /// What the decision applies to.
    #[arg(long)]
    pub target: String,

    /// Confidence in the decision, in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    pub confidence: f64,

    /// Free-form JSON parameters.
    #[arg(long)]
    pub parameters: Option<String>,

    /// An alternative that was considered. Repeatable.
    #[arg(long = "alternative")]
    pub alternatives: Vec<String>,

    /// A premise of the reasoning. Repeatable.
    #[arg(long = "premise")]
    pub premises: Vec<String>,

    /// A conclusion of the reasoning. Repeatable.
    #[arg(long = "conclusion")]
    pub conclusions: Vec<String>,

    /// Confidence in the reasoning, in [0, 1]. Defaults to the decision's.
    #[arg(long)]
    pub reasoning_confidence: Option<f64>,

    /// JSON file holding an explicit ethical justification. When omitted
    /// the built-in heuristic evaluator produces one.
    #[arg(long)]
    pub justification: Option<PathBuf>,
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Only decisions of this kind.
    #[arg(long)]
    pub kind: Option<DecisionKind>,

    /// Only decisions at or above this confidence.
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Only blocks stamped at or after this Unix time (ms).
    #[arg(long)]
    pub start: Option<u64>,

    /// Only blocks stamped at or before this Unix time (ms).
    #[arg(long)]
    pub end: Option<u64>,
}

impl SearchArgs {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            kind: self.kind,
            min_confidence: self.min_confidence,
            start_time: self.start,
            end_time: self.end,
        }
    }
}

/// Arguments for the `report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Block index.
    pub index: u64,
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file. Stdout when omitted.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        LedgerCli::command().debug_assert();
    }

    #[test]
    fn append_flags_parse() {
        let cli = LedgerCli::try_parse_from([
            "decision-ledger",
            "-f",
            "/tmp/l.json",
            "--difficulty",
            "2",
            "append",
            "--kind",
            "emergency",
            "--action",
            "shutdown",
            "--target",
            "db",
            "--alternative",
            "wait",
            "--alternative",
            "failover",
        ])
        .unwrap();

        assert_eq!(cli.global.file, PathBuf::from("/tmp/l.json"));
        assert_eq!(cli.global.ledger_config().difficulty, 2);
        match cli.command {
            Commands::Append(args) => {
                assert_eq!(args.kind, DecisionKind::Emergency);
                assert_eq!(args.alternatives, ["wait", "failover"]);
                assert!(args.id.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = LedgerCli::try_parse_from([
            "decision-ledger",
            "search",
            "--kind",
            "whimsical",
        ]);
        assert!(result.is_err());
    }
}
