// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Decision Ledger CLI
//!
//! Entry point for the `decision-ledger` binary. Parses CLI arguments,
//! initializes logging, runs one subcommand against the ledger file and
//! prints its result.
//!
//! - `init`     - create a genesis-only ledger file
//! - `append`   - seal a decision into the ledger
//! - `validate` - audit the chain; exits non-zero when it is broken
//! - `stats`    - aggregate statistics
//! - `search`   - filter decisions by kind, confidence and time
//! - `report`   - forensic report for one block
//! - `history`  - ethical history of every decision
//! - `export`   - canonical chain JSON
//! - `version`  - print build version information

mod cli;
mod commands;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use cli::{Commands, LedgerCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LedgerCli::parse();
    logging::init_logging(
        "decision_ledger=info,decision_ledger_cli=info",
        LogFormat::from_str_lossy(&cli.global.log_format),
    );

    let global = &cli.global;
    match &cli.command {
        Commands::Init(args) => print_json(&commands::init(global, args)?),
        Commands::Append(args) => print_json(&commands::append(global, args).await?),
        Commands::Validate => {
            let report = commands::validate(global)?;
            print_json(&report)?;
            if !report.valid {
                bail!(
                    "{} failed validation with {} error(s)",
                    global.file.display(),
                    report.errors.len()
                );
            }
            Ok(())
        }
        Commands::Stats => print_json(&commands::stats(global)?),
        Commands::Search(args) => print_json(&commands::search(global, args)?),
        Commands::Report(args) => {
            println!("{}", commands::report(global, args.index)?);
            Ok(())
        }
        Commands::History => print_json(&commands::history(global)?),
        Commands::Export(args) => {
            if let Some(serialized) = commands::export(global, args)? {
                println!("{}", serialized);
            }
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Pretty-print a result to stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render result")?;
    println!("{}", rendered);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("decision-ledger {}", env!("CARGO_PKG_VERSION"));
    println!(
        "hash            {}",
        decision_ledger::config::HASH_ALGORITHM
    );
    println!("rustc           {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
