//! Doctrine registry smoke CLI.
//!
//! # Responsibility
//! - Verify `doctrine_core` linkage with a seeded registry.
//! - Print the compliance report as JSON for quick local checks.
//! - Save, list, and restore registry snapshots in a SQLite file.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use doctrine_core::db::open_db;
use doctrine_core::{
    core_version, default_log_level, generate_report, init_logging, load_registry,
    ComplianceReport, DoctrineRegistry, RegistryConfig, RegistryStore, SnapshotId,
    SqliteRegistryStore, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Doctrine registry probe
#[derive(Parser, Debug)]
#[command(name = "doctrine", version, about, long_about = None)]
struct Cli {
    /// Absolute directory for rolling log files; logging stays off when unset
    #[arg(long, global = true, env = "DOCTRINE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "DOCTRINE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Agent recorded in audit entries
    #[arg(long, global = true, default_value = doctrine_core::DEFAULT_AGENT)]
    agent: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the compliance report of the seeded registry
    Report {
        /// Externally tracked STAMPED process count
        #[arg(long, default_value_t = 0)]
        stamped: usize,
    },
    /// Save the seeded registry as a snapshot
    Save {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = "seed")]
        label: String,
    },
    /// List saved snapshots, newest first
    List {
        #[arg(long)]
        db: PathBuf,
    },
    /// Print the compliance report of one saved snapshot
    Inspect {
        #[arg(long)]
        db: PathBuf,
        id: SnapshotId,
        #[arg(long, default_value_t = 0)]
        stamped: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| anyhow!("log directory must be valid UTF-8"))?;
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let config = RegistryConfig::seeded().with_default_agent(cli.agent.as_str());

    match cli.command {
        Command::Report { stamped } => {
            let registry = DoctrineRegistry::with_system_clock(config)?;
            print_report(&generate_report(&registry, stamped))?;
        }
        Command::Save { db, label } => {
            let registry = DoctrineRegistry::with_system_clock(config)?;
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            let id = SqliteRegistryStore::new(&conn).save(&registry, &label)?;
            println!("{id}");
        }
        Command::List { db } => {
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            for summary in SqliteRegistryStore::new(&conn).list()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    summary.id, summary.saved_at_ms, summary.record_count, summary.label
                );
            }
        }
        Command::Inspect { db, id, stamped } => {
            let conn = open_db(&db).with_context(|| format!("cannot open {}", db.display()))?;
            let store = SqliteRegistryStore::new(&conn);
            let config = RegistryConfig::default().with_default_agent(cli.agent.as_str());
            let registry = load_registry(&store, id, config, Arc::new(SystemClock))?
                .ok_or_else(|| anyhow!("snapshot not found: {id}"))?;
            print_report(&generate_report(&registry, stamped))?;
        }
    }

    log::debug!("event=cli_exit module=cli status=ok version={}", core_version());
    Ok(())
}

fn print_report(report: &ComplianceReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_flags_are_global_and_env_backed() {
        let cli = Cli::try_parse_from([
            "doctrine",
            "report",
            "--stamped",
            "3",
            "--log-dir",
            "/tmp/doctrine-logs",
            "--log-level",
            "warn",
        ])
        .expect("report args should parse");

        assert!(matches!(cli.command, Command::Report { stamped: 3 }));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert_eq!(cli.agent, "system");

        let log_dir = Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "log_dir")
            .and_then(|arg| arg.get_env())
            .map(|env| env.to_os_string());
        assert_eq!(log_dir, Some("DOCTRINE_LOG_DIR".into()));
    }
}
