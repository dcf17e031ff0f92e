use rusqlite::Connection;
use statement_core::db::migrations::latest_version;
use statement_core::{connect_to_db, create_tables, open_db, open_db_in_memory, DatabaseConfig, DbError};

#[test]
fn open_db_in_memory_creates_both_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "Users");
    assert_table_exists(&conn, "Transactions");
}

#[test]
fn connect_to_db_does_not_create_tables() {
    let conn = connect_to_db(&DatabaseConfig::in_memory()).unwrap();

    assert_eq!(schema_version(&conn), 0);
    assert_table_missing(&conn, "Users");
}

#[test]
fn connect_to_db_enables_foreign_keys() {
    let conn = connect_to_db(&DatabaseConfig::in_memory()).unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn connect_to_db_applies_configured_busy_timeout() {
    let default_conn = connect_to_db(&DatabaseConfig::in_memory()).unwrap();
    assert_eq!(busy_timeout_ms(&default_conn), 5_000);

    let config = DatabaseConfig {
        busy_timeout_ms: Some(0),
        ..DatabaseConfig::in_memory()
    };
    assert!(config.busy_timeout().is_zero());
    let conn = connect_to_db(&config).unwrap();
    assert_eq!(busy_timeout_ms(&conn), 0);
}

#[test]
fn create_tables_is_idempotent() {
    let mut conn = connect_to_db(&DatabaseConfig::in_memory()).unwrap();

    create_tables(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO Users (GoogleEmail) VALUES ('a@example.com');",
        [],
    )
    .unwrap();
    create_tables(&mut conn).unwrap();

    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM Users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1);
}

#[test]
fn reopening_file_database_keeps_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statements.sqlite3");

    let first = open_db(&path).unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_table_exists(&second, "Transactions");
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
fn transaction_hash_is_unique_per_user() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO Users (GoogleEmail) VALUES ('a@example.com'), ('b@example.com');
         INSERT INTO Transactions (UserID, transaction_hash) VALUES (1, 'h1');
         INSERT INTO Transactions (UserID, transaction_hash) VALUES (2, 'h1');",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO Transactions (UserID, transaction_hash) VALUES (1, 'h1');",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn transactions_require_existing_user() {
    let conn = open_db_in_memory().unwrap();
    let orphan = conn.execute(
        "INSERT INTO Transactions (UserID, transaction_hash) VALUES (99, 'h1');",
        [],
    );
    assert!(orphan.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn busy_timeout_ms(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA busy_timeout;", [], |row| row.get(0)).unwrap()
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(table_exists(conn, table_name), "table {table_name} does not exist");
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    assert!(!table_exists(conn, table_name), "table {table_name} should not exist yet");
}
