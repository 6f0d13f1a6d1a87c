use rusqlite::Connection;
use uniadmin_core::db::migrations::latest_version;
use uniadmin_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn in_memory_database_has_staff_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "staff");
    assert_table_exists(&conn, "schedule_entries");
    assert_eq!(foreign_keys(&conn), 1);
}

#[test]
fn reopening_a_migrated_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uniadmin.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO staff (id, display_name, role, specialty, active)
             VALUES ('T-1', 'Ana', 'TEACHER', NULL, 1);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    let rows: i64 = second
        .query_row("SELECT COUNT(*) FROM staff;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 42;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 42);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schedule_rows_must_reference_existing_staff_and_be_ordered() {
    let conn = open_db_in_memory().unwrap();

    let orphan = conn.execute(
        "INSERT INTO schedule_entries (id, staff_id, start_at, end_at)
         VALUES ('e1', 'missing', '2025-06-01T09:00:00.000000', '2025-06-01T10:00:00.000000');",
        [],
    );
    assert!(orphan.is_err());

    conn.execute(
        "INSERT INTO staff (id, display_name, role, specialty, active)
         VALUES ('M-1', 'Luis', 'MEDICAL_STAFF', 'DENTISTRY', 1);",
        [],
    )
    .unwrap();
    let reversed = conn.execute(
        "INSERT INTO schedule_entries (id, staff_id, start_at, end_at)
         VALUES ('e2', 'M-1', '2025-06-01T10:00:00.000000', '2025-06-01T09:00:00.000000');",
        [],
    );
    assert!(reversed.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn foreign_keys(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
