use doctrine_core::db::migrations::{latest_version, snapshot_tables};
use doctrine_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let tables: Vec<&str> = snapshot_tables().collect();
    assert_eq!(
        tables,
        vec!["snapshots", "snapshot_records", "snapshot_audit_entries"]
    );
    for table in tables {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_same_database_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doctrine.db");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "snapshots");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn current_version_with_dropped_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF; DROP TABLE snapshot_audit_entries;")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MissingTable(table) => assert_eq!(table, "snapshot_audit_entries"),
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
