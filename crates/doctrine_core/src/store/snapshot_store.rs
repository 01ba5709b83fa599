//! Snapshot store contract and SQLite implementation.

use crate::clock::Clock;
use crate::config::RegistryConfig;
use crate::db::DbError;
use crate::model::audit::{AuditAction, AuditEntry, AuditLog, ChangeSet};
use crate::model::doctrine::{DoctrineRecord, DoctrineStatus, Phase};
use crate::model::identifier::{self, Category};
use crate::registry::{DoctrineRegistry, RegistryError};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier of one saved snapshot.
pub type SnapshotId = Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(SnapshotId),
    InvalidData(String),
    Serialization(serde_json::Error),
    Registry(RegistryError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "snapshot not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
            Self::Serialization(err) => write!(f, "audit change payload encoding failed: {err}"),
            Self::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<RegistryError> for StoreError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Listing metadata for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub id: SnapshotId,
    pub label: String,
    /// Unix epoch milliseconds.
    pub saved_at_ms: i64,
    pub record_count: usize,
}

/// Save/load/list/delete contract for registry persistence.
pub trait RegistryStore {
    fn save(&self, registry: &DoctrineRegistry, label: &str) -> StoreResult<SnapshotId>;
    /// Returns records in saved order, or `None` for an unknown snapshot.
    fn load(&self, id: SnapshotId) -> StoreResult<Option<Vec<DoctrineRecord>>>;
    /// Newest snapshot first.
    fn list(&self) -> StoreResult<Vec<SnapshotSummary>>;
    fn delete(&self, id: SnapshotId) -> StoreResult<()>;
}

/// Loads a snapshot and rebuilds a registry from it.
///
/// Returns `Ok(None)` for an unknown snapshot id.
pub fn load_registry(
    store: &impl RegistryStore,
    id: SnapshotId,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
) -> StoreResult<Option<DoctrineRegistry>> {
    let Some(records) = store.load(id)? else {
        return Ok(None);
    };
    let registry = DoctrineRegistry::restore(config, clock, records)?;
    Ok(Some(registry))
}

/// SQLite-backed snapshot store.
pub struct SqliteRegistryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistryStore<'conn> {
    /// Expects a connection opened through `db::open_db*` so the schema exists.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_audit(&self, id: &str, identifier: &str) -> StoreResult<AuditLog> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, action, agent, changes_json, compliant
             FROM snapshot_audit_entries
             WHERE snapshot_id = ?1 AND identifier = ?2
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query(params![id, identifier])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_audit_row(row, identifier)?);
        }

        AuditLog::from_entries(entries).map_err(|err| {
            StoreError::InvalidData(format!("audit trail of `{identifier}` is unordered: {err}"))
        })
    }
}

impl RegistryStore for SqliteRegistryStore<'_> {
    fn save(&self, registry: &DoctrineRegistry, label: &str) -> StoreResult<SnapshotId> {
        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO snapshots (id, label, saved_at, record_count)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000), ?3);",
            params![id_text, label, to_db_int(registry.len())],
        )?;

        for (position, record) in registry.records().enumerate() {
            let key = record.key();
            tx.execute(
                "INSERT INTO snapshot_records (
                    snapshot_id,
                    position,
                    identifier,
                    title,
                    description,
                    category,
                    phase,
                    status,
                    owner,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    id_text,
                    to_db_int(position),
                    key,
                    record.title,
                    record.description,
                    record.category.as_str(),
                    record.phase.as_str(),
                    record.status.as_str(),
                    record.owner,
                    record.created_at_ms,
                    record.updated_at_ms,
                ],
            )?;

            for (seq, entry) in record.audit.iter().enumerate() {
                let changes_json = serde_json::to_string(&entry.changes)?;
                tx.execute(
                    "INSERT INTO snapshot_audit_entries (
                        snapshot_id,
                        identifier,
                        seq,
                        timestamp,
                        action,
                        agent,
                        changes_json,
                        compliant
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                    params![
                        id_text,
                        key,
                        to_db_int(seq),
                        entry.timestamp_ms,
                        entry.action.as_str(),
                        entry.agent,
                        changes_json,
                        entry.compliant,
                    ],
                )?;
            }
        }

        tx.commit()?;
        info!(
            "event=snapshot_save module=store status=ok snapshot_id={id} records={}",
            registry.len()
        );
        Ok(id)
    }

    fn load(&self, id: SnapshotId) -> StoreResult<Option<Vec<DoctrineRecord>>> {
        let id_text = id.to_string();
        let expected_count: Option<i64> = self
            .conn
            .query_row(
                "SELECT record_count FROM snapshots WHERE id = ?1;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(expected_count) = expected_count else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT identifier, title, description, category, phase, status, owner,
                    created_at, updated_at
             FROM snapshot_records
             WHERE snapshot_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id_text.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = parse_record_row(row)?;
            record.audit = self.load_audit(&id_text, &record.key())?;
            records.push(record);
        }

        if to_db_int(records.len()) != expected_count {
            warn!(
                "event=snapshot_load module=store status=error snapshot_id={id} error_code=record_count_mismatch"
            );
            return Err(StoreError::InvalidData(format!(
                "snapshot {id} declares {expected_count} records but holds {}",
                records.len()
            )));
        }

        info!(
            "event=snapshot_load module=store status=ok snapshot_id={id} records={}",
            records.len()
        );
        Ok(Some(records))
    }

    fn list(&self) -> StoreResult<Vec<SnapshotSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, saved_at, record_count
             FROM snapshots
             ORDER BY saved_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(parse_summary_row(row)?);
        }
        Ok(summaries)
    }

    fn delete(&self, id: SnapshotId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM snapshots WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        info!("event=snapshot_delete module=store status=ok snapshot_id={id}");
        Ok(())
    }
}

fn parse_summary_row(row: &Row<'_>) -> StoreResult<SnapshotSummary> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in snapshots.id"))
    })?;
    let count: i64 = row.get("record_count")?;
    let record_count = usize::try_from(count).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid record_count `{count}` in snapshots.record_count"
        ))
    })?;

    Ok(SnapshotSummary {
        id,
        label: row.get("label")?,
        saved_at_ms: row.get("saved_at")?,
        record_count,
    })
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<DoctrineRecord> {
    let identifier_text: String = row.get("identifier")?;
    let identifier = identifier::parse(&identifier_text).map_err(|err| {
        StoreError::InvalidData(format!(
            "invalid identifier in snapshot_records.identifier: {err}"
        ))
    })?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in snapshot_records.category"
        ))
    })?;

    let phase_text: String = row.get("phase")?;
    let phase = Phase::parse(&phase_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid phase `{phase_text}` in snapshot_records.phase"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = DoctrineStatus::parse(&status_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid status `{status_text}` in snapshot_records.status"
        ))
    })?;

    Ok(DoctrineRecord {
        identifier,
        title: row.get("title")?,
        description: row.get("description")?,
        category,
        phase,
        status,
        owner: row.get("owner")?,
        created_at_ms: row.get("created_at")?,
        updated_at_ms: row.get("updated_at")?,
        audit: AuditLog::new(),
    })
}

fn parse_audit_row(row: &Row<'_>, identifier: &str) -> StoreResult<AuditEntry> {
    let action_text: String = row.get("action")?;
    let action = AuditAction::parse(&action_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid audit action `{action_text}` for `{identifier}`"
        ))
    })?;

    let changes_json: String = row.get("changes_json")?;
    let changes: ChangeSet = serde_json::from_str(&changes_json).map_err(|err| {
        StoreError::InvalidData(format!(
            "invalid audit changes for `{identifier}`: {err}"
        ))
    })?;

    Ok(AuditEntry {
        timestamp_ms: row.get("timestamp")?,
        action,
        agent: row.get("agent")?,
        changes,
        compliant: row.get("compliant")?,
    })
}

fn to_db_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
