//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections from configuration.
//! - Configure connection pragmas required by the schema constraints.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `open_db*` connections additionally have both tables provisioned.

use super::migrations::create_tables;
use super::DbResult;
use crate::config::DatabaseConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Establishes a connection described by `[database]` settings.
///
/// Tables are not created here; call [`create_tables`] before use.
///
/// # Side effects
/// - Emits `db_connect` logging events with duration and status.
pub fn connect_to_db(config: &DatabaseConfig) -> DbResult<Connection> {
    let started_at = Instant::now();
    let mode = if config.is_in_memory() { "memory" } else { "file" };
    info!("event=db_connect module=db status=start mode={mode}");

    let opened = if config.is_in_memory() {
        Connection::open_in_memory()
    } else {
        Connection::open(config.path.trim())
    };

    let conn = opened.map_err(|err| {
        error!(
            "event=db_connect module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    if let Err(err) = configure_connection(&conn, config.busy_timeout()) {
        error!(
            "event=db_connect module=db status=error mode={} duration_ms={} error_code=db_configure_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=db_connect module=db status=ok mode={} duration_ms={}",
        mode,
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// Opens a SQLite database file and provisions both tables.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let config = DatabaseConfig::new(path.as_ref().to_string_lossy());
    open_with(&config)
}

/// Opens a private in-memory database and provisions both tables.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(&DatabaseConfig::in_memory())
}

fn open_with(config: &DatabaseConfig) -> DbResult<Connection> {
    let mut conn = connect_to_db(config)?;
    create_tables(&mut conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    // Zero disables the busy handler; contended writes fail immediately.
    conn.busy_timeout(busy_timeout)?;
    Ok(())
}
