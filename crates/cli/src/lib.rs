//! `tierbadge` command-line surface.
//!
//! Thin glue: parse arguments, load configuration, call into the
//! classification and session crates, print JSON lines.

pub mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tierbadge_classification::{score_rows, ClassificationTier, UserRow};
use tierbadge_core::{Clock, SystemClock, UserId};
use tierbadge_session::{FileStore, KeyValueStore, LoginRecord, SessionLedger};

pub use config::Config;

#[derive(Debug, Parser)]
#[command(name = "tierbadge", about = "User engagement badges and scores")]
pub struct Cli {
    /// Human-readable logs instead of JSON.
    #[arg(long, global = true)]
    pub pretty_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a JSON array of user rows (`-` reads stdin).
    Score { input: PathBuf },
    /// Record a login and print the recency tier it earned.
    Login { user_id: UserId },
    /// Create the session entry for a newly registered user.
    Register {
        user_id: UserId,
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the stored session entry and its current tier.
    Show { user_id: UserId },
    /// Remove the session entry.
    Logout { user_id: UserId },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginView {
    classification: ClassificationTier,
    description: &'static str,
    last_login: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryView {
    current_tier: ClassificationTier,
    description: &'static str,
    record: LoginRecord,
}

/// Run `command` against the configured file store and the wall clock.
pub fn run(command: Command, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let ledger = SessionLedger::with_thresholds(
        FileStore::new(&config.store_path),
        SystemClock,
        config.thresholds,
    );
    execute(command, &ledger, out)
}

/// Run `command` against an explicit ledger.
pub fn execute<S, C>(
    command: Command,
    ledger: &SessionLedger<S, C>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
{
    match command {
        Command::Score { input } => {
            let raw = read_input(&input)?;
            let rows: Vec<UserRow> =
                serde_json::from_str(&raw).context("input is not a JSON array of user rows")?;
            tracing::info!(rows = rows.len(), "scoring user listing");
            for scored in score_rows(&rows) {
                writeln!(out, "{}", serde_json::to_string(&scored)?)?;
            }
        }
        Command::Login { user_id } => {
            let outcome = ledger.record_login(&user_id);
            let view = LoginView {
                classification: outcome.classification,
                description: outcome.classification.description(),
                last_login: outcome.last_login,
            };
            writeln!(out, "{}", serde_json::to_string(&view)?)?;
        }
        Command::Register {
            user_id,
            email,
            name,
        } => {
            let record = ledger
                .register(&user_id, email, name)
                .with_context(|| format!("failed to register {user_id}"))?;
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
        Command::Show { user_id } => {
            let record = ledger
                .user_data(&user_id)
                .with_context(|| format!("no session entry for {user_id}"))?;
            let current_tier = ledger.current_tier(&user_id);
            let view = EntryView {
                current_tier,
                description: current_tier.description(),
                record,
            };
            writeln!(out, "{}", serde_json::to_string(&view)?)?;
        }
        Command::Logout { user_id } => {
            ledger
                .clear(&user_id)
                .with_context(|| format!("failed to clear session for {user_id}"))?;
        }
    }
    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        return Ok(raw);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}
