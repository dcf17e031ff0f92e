//! One-time schema creation for `Users` and `Transactions`.
//!
//! # Responsibility
//! - Execute the `CREATE TABLE IF NOT EXISTS` statements in one transaction.
//! - Stamp the created schema version into `PRAGMA user_version`.
//!
//! # Invariants
//! - Re-running on a provisioned database is a no-op.
//! - A database stamped by a newer build is rejected, never rewritten.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("0001_init.sql");

/// Returns the schema version this build creates.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Creates both tables if they do not already exist.
///
/// All statements run in a single transaction: on error nothing is committed
/// and the transaction is rolled back when dropped.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was created by a newer build.
/// - `DbError::Sqlite` for any driver failure.
pub fn create_tables(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        error!(
            "event=create_tables module=db status=error error_code=schema_too_new db_version={} supported={}",
            current_version, SCHEMA_VERSION
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if let Err(err) = execute_schema(conn) {
        error!(
            "event=create_tables module=db status=error error_code=ddl_failed error={}",
            err
        );
        return Err(err);
    }

    info!(
        "event=create_tables module=db status=ok version={} previous_version={}",
        SCHEMA_VERSION, current_version
    );
    Ok(())
}

fn execute_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
