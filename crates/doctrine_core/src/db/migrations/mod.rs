//! Snapshot schema migrations.
//!
//! # Responsibility
//! - List the snapshot schema steps and the tables each one owns.
//! - Bring a connection up to the latest step in one transaction.
//! - Confirm the snapshot tables exist before the store touches them.
//!
//! # Invariants
//! - Step versions increase strictly; the applied step is mirrored to `PRAGMA user_version`.
//! - A database at the latest version still missing a snapshot table is rejected.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
    tables: &'static [&'static str],
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
    tables: &["snapshots", "snapshot_records", "snapshot_audit_entries"],
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Tables the snapshot store reads and writes, in creation order.
pub fn snapshot_tables() -> impl Iterator<Item = &'static str> {
    SCHEMA_STEPS.iter().flat_map(|step| step.tables.iter().copied())
}

/// Applies pending schema steps, then checks every snapshot table exists.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `MissingTable` when the recorded version claims a table that is absent.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let db_version = user_version(conn)?;
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > db_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in &pending {
            tx.execute_batch(step.sql)?;
            tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
        }
        tx.commit()?;

        let created: Vec<&str> = pending
            .iter()
            .flat_map(|step| step.tables.iter().copied())
            .collect();
        info!(
            "event=db_migrate module=db status=ok from_version={db_version} to_version={latest} tables={}",
            created.join(",")
        );
    }

    for table in snapshot_tables() {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}
