//! Connection bootstrap for the tracker store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections through one shared
//!   bootstrap path.
//! - Configure connection pragmas required by engine behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the tracker store at `path` and applies all pending migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with mode and duration.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path))
}

/// Opens an in-memory tracker store and applies all pending migrations.
///
/// Used by integration tests and throwaway scratch sessions.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory)
}

fn bootstrap(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = open()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });

    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => {
            info!("event=store_open module=db status=ok mode={mode} duration_ms={duration_ms}");
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode={mode} duration_ms={duration_ms} error={err}"
            );
        }
    }

    result
}
