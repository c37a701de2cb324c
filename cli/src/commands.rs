//! # Subcommand Implementations
//!
//! Each function loads the ledger file, does one thing, and returns a value
//! for `main` to print. Files are only ever written whole: the chain is
//! exported to a uniquely named temp file in the same directory and renamed
//! into place, so a crash mid write never leaves a truncated ledger behind.
//!
//! Writers (`init`, `append`) hold an exclusive advisory lock on
//! `<file>.lock` from load to rename. Two processes appending to the same
//! file therefore take turns, and the second one seals on top of the first.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use anyhow::{bail, Context, Result};
use serde_json::json;

use decision_ledger::{
    validate_blocks, AppendCoordinator, Block, ChainStatistics, DecisionRecord,
    EthicalHistoryEntry, EthicalJustification, Ledger, ReasoningRecord, ValidationReport,
};

use crate::cli::{AppendArgs, ExportArgs, GlobalArgs, InitArgs, SearchArgs};

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Load and fully validate the ledger at `global.file`.
pub fn load(global: &GlobalArgs) -> Result<Ledger> {
    let path = &global.file;
    if !path.exists() {
        bail!(
            "no ledger at {} (run `decision-ledger init` first)",
            path.display()
        );
    }
    let serialized = fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger file {}", path.display()))?;

    let mut ledger = Ledger::new(global.ledger_config()).context("invalid ledger configuration")?;
    ledger
        .import_chain(&serialized)
        .into_result()
        .with_context(|| format!("failed to load {}", path.display()))?;

    tracing::debug!(path = %path.display(), blocks = ledger.len(), "ledger loaded");
    Ok(ledger)
}

/// Write the canonical export of `ledger` to `path`.
pub fn save(ledger: &Ledger, path: &Path) -> Result<()> {
    let serialized = ledger.export_chain()?;
    write_atomically(path, &serialized)?;
    tracing::debug!(path = %path.display(), blocks = ledger.len(), "ledger saved");
    Ok(())
}

fn parent_dir(path: &Path) -> Result<&Path> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    Ok(dir)
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = parent_dir(path)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move ledger into place at {}", path.display()))?;
    Ok(())
}

/// Exclusive advisory lock on `<ledger>.lock`. Released when dropped.
#[derive(Debug)]
pub struct LedgerLock {
    _file: File,
}

impl LedgerLock {
    /// Block until no other writer holds the lock for `ledger`.
    pub fn acquire(ledger: &Path) -> Result<Self> {
        parent_dir(ledger)?;
        let mut name = ledger.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("failed to lock {}", path.display()))?;
        tracing::debug!(lock = %path.display(), "ledger lock acquired");
        Ok(Self { _file: file })
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

/// Create a fresh genesis-only ledger file.
pub fn init(global: &GlobalArgs, args: &InitArgs) -> Result<serde_json::Value> {
    let path = &global.file;
    let _lock = LedgerLock::acquire(path)?;
    if path.exists() && !args.force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }

    let ledger = Ledger::new(global.ledger_config()).context("invalid ledger configuration")?;
    save(&ledger, path)?;
    tracing::info!(path = %path.display(), difficulty = global.difficulty, "ledger initialized");

    Ok(json!({
        "file": path.display().to_string(),
        "difficulty": global.difficulty,
        "genesisHash": ledger.latest().hash,
    }))
}

/// Build the payloads described by `args`, seal them, and persist.
pub async fn append(global: &GlobalArgs, args: &AppendArgs) -> Result<Block> {
    let decision = decision_from_args(args)?;
    let reasoning = ReasoningRecord::new(
        args.premises.iter().cloned(),
        args.conclusions.iter().cloned(),
        args.reasoning_confidence.unwrap_or(args.confidence),
    );
    let justification = match &args.justification {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read justification {}", path.display()))?;
            let parsed: EthicalJustification = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid justification", path.display()))?;
            Some(parsed)
        }
        None => None,
    };

    let lock_path = global.file.clone();
    let _lock = tokio::task::spawn_blocking(move || LedgerLock::acquire(&lock_path))
        .await
        .context("lock task failed")??;

    let coordinator = AppendCoordinator::new(load(global)?);
    let block = coordinator
        .append_async(decision, reasoning, justification)
        .await?;

    let snapshot = coordinator.export_chain()?;
    write_atomically(&global.file, &snapshot)?;
    Ok(block)
}

fn decision_from_args(args: &AppendArgs) -> Result<DecisionRecord> {
    let id = args
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut decision = DecisionRecord::new(id, args.kind, &args.action, &args.target)
        .with_confidence(args.confidence)
        .with_alternatives(args.alternatives.iter().cloned());
    if let Some(raw) = &args.parameters {
        let parameters =
            serde_json::from_str(raw).context("--parameters is not valid JSON")?;
        decision = decision.with_parameters(parameters);
    }
    Ok(decision)
}

/// Audit the file as stored. Unlike [`load`], a broken chain still yields
/// a full report instead of an error.
pub fn validate(global: &GlobalArgs) -> Result<ValidationReport> {
    let path = &global.file;
    let serialized = fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger file {}", path.display()))?;
    let config = global.ledger_config();
    config.validate().context("invalid ledger configuration")?;

    Ok(match serde_json::from_str::<Vec<Block>>(&serialized) {
        Ok(blocks) => validate_blocks(&blocks, &config),
        Err(e) => ValidationReport::failed(format!("failed to parse chain: {}", e)),
    })
}

pub fn stats(global: &GlobalArgs) -> Result<ChainStatistics> {
    Ok(load(global)?.statistics())
}

pub fn search(global: &GlobalArgs, args: &SearchArgs) -> Result<Vec<Block>> {
    Ok(load(global)?.search(&args.criteria()))
}

pub fn report(global: &GlobalArgs, index: u64) -> Result<String> {
    let ledger = load(global)?;
    match ledger.forensic_report(index) {
        Some(report) => Ok(report.to_string()),
        None => bail!(
            "no block at index {} (chain has {} blocks)",
            index,
            ledger.len()
        ),
    }
}

pub fn history(global: &GlobalArgs) -> Result<Vec<EthicalHistoryEntry>> {
    Ok(load(global)?.ethical_history())
}

/// Canonical export. Returns the JSON when no output file was given.
pub fn export(global: &GlobalArgs, args: &ExportArgs) -> Result<Option<String>> {
    let ledger = load(global)?;
    match &args.output {
        Some(path) => {
            save(&ledger, path)?;
            tracing::info!(path = %path.display(), blocks = ledger.len(), "chain exported");
            Ok(None)
        }
        None => Ok(Some(ledger.export_chain()?)),
    }
}
