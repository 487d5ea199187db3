//! Reset bookkeeping and settings repository.
//!
//! # Responsibility
//! - Persist the singleton bookkeeping row, the append-only reset history
//!   and the key-value settings surface.
//!
//! # Invariants
//! - The bookkeeping row always exists (seeded by migration) and only the
//!   `id = 1` row is ever touched.
//! - Unparsable stored bookkeeping degrades to empty fields with a warning,
//!   so the decision path sees bootstrap rather than an error.

use crate::model::reset::{ResetBookkeeping, ResetHistoryEntry, ResetKind, ResetReason};
use crate::repo::{date_to_db, datetime_to_db, RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for reset bookkeeping, history and settings.
pub trait ResetStateRepository {
    /// Loads the singleton bookkeeping record, degrading bad fields to empty.
    fn load_bookkeeping(&self) -> RepoResult<ResetBookkeeping>;
    /// Stores the singleton bookkeeping record.
    fn save_bookkeeping(&self, bookkeeping: &ResetBookkeeping) -> RepoResult<()>;
    /// Appends one entry to the reset history log.
    fn append_history(&self, entry: &ResetHistoryEntry) -> RepoResult<()>;
    /// Returns the reset history, oldest first.
    fn history(&self) -> RepoResult<Vec<ResetHistoryEntry>>;
    /// Reads one settings value.
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>>;
    /// Writes one settings value (upsert).
    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes one settings value.
    fn remove_setting(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed reset state repository.
pub struct SqliteResetStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResetStateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResetStateRepository for SqliteResetStateRepository<'_> {
    fn load_bookkeeping(&self) -> RepoResult<ResetBookkeeping> {
        let row = self
            .conn
            .query_row(
                "SELECT last_reset_date, last_reset_at, reset_time_changed_at
                 FROM reset_state
                 WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((date_text, reset_at_ms, changed_at_ms)) = row else {
            warn!("event=bookkeeping_load module=reset_repo status=missing_row");
            return Ok(ResetBookkeeping::default());
        };

        Ok(ResetBookkeeping {
            last_reset_date: date_text.and_then(|value| lenient_date("last_reset_date", &value)),
            last_reset_at: reset_at_ms.and_then(|value| lenient_datetime("last_reset_at", value)),
            reset_time_changed_at: changed_at_ms
                .and_then(|value| lenient_datetime("reset_time_changed_at", value)),
        })
    }

    fn save_bookkeeping(&self, bookkeeping: &ResetBookkeeping) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE reset_state
             SET
                last_reset_date = ?1,
                last_reset_at = ?2,
                reset_time_changed_at = ?3
             WHERE id = 1;",
            params![
                bookkeeping.last_reset_date.map(date_to_db),
                bookkeeping.last_reset_at.map(datetime_to_db),
                bookkeeping.reset_time_changed_at.map(datetime_to_db),
            ],
        )?;

        Ok(())
    }

    fn append_history(&self, entry: &ResetHistoryEntry) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO reset_history (date, timestamp, kind, reason)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                date_to_db(entry.date),
                datetime_to_db(entry.timestamp),
                entry.kind.as_str(),
                entry.reason.as_str(),
            ],
        )?;

        Ok(())
    }

    fn history(&self) -> RepoResult<Vec<ResetHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, timestamp, kind, reason
             FROM reset_history
             ORDER BY seq ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let date_text: String = row.get("date")?;
            let kind_text: String = row.get("kind")?;
            let reason_text: String = row.get("reason")?;

            let date: NaiveDate = date_text.parse().map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid date value `{date_text}` in reset_history.date"
                ))
            })?;
            let timestamp = DateTime::from_timestamp_millis(row.get("timestamp")?)
                .map(|instant| instant.naive_utc())
                .ok_or_else(|| {
                    RepoError::InvalidData("invalid timestamp in reset_history.timestamp".into())
                })?;
            let kind = ResetKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid kind `{kind_text}` in reset_history.kind"
                ))
            })?;
            let reason = ResetReason::parse(&reason_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid reason `{reason_text}` in reset_history.reason"
                ))
            })?;

            entries.push(ResetHistoryEntry {
                date,
                timestamp,
                kind,
                reason,
            });
        }

        Ok(entries)
    }

    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO app_settings (key, value)
             VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;

        Ok(())
    }

    fn remove_setting(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM app_settings WHERE key = ?1;", [key])?;

        Ok(())
    }
}

fn lenient_date(column: &str, value: &str) -> Option<NaiveDate> {
    match value.parse() {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(
                "event=bookkeeping_load module=reset_repo status=degraded column={column} value={value}"
            );
            None
        }
    }
}

fn lenient_datetime(column: &str, value: i64) -> Option<NaiveDateTime> {
    match DateTime::from_timestamp_millis(value) {
        Some(instant) => Some(instant.naive_utc()),
        None => {
            warn!(
                "event=bookkeeping_load module=reset_repo status=degraded column={column} value={value}"
            );
            None
        }
    }
}
