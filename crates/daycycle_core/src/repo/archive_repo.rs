//! Archive repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist write-once day snapshots produced by the archiving phase.
//!
//! # Invariants
//! - An archive for a date is written at most once; re-runs are no-ops.
//! - Archive rows are never updated after the initial write.

use crate::model::archive::{ArchiveRecord, ArchivedItem};
use crate::repo::{date_to_db, datetime_to_db, parse_db_date, parse_db_datetime, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Repository interface for day-snapshot archives.
pub trait ArchiveRepository {
    /// Writes one archive if none exists for its date yet.
    ///
    /// Returns `true` when the snapshot was written, `false` when the date
    /// was already archived by an earlier run.
    fn write_archive(&self, archive: &ArchiveRecord) -> RepoResult<bool>;
    /// Reads back one archive by date.
    fn get_archive(&self, date: NaiveDate) -> RepoResult<Option<ArchiveRecord>>;
}

/// SQLite-backed archive repository.
pub struct SqliteArchiveRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArchiveRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ArchiveRepository for SqliteArchiveRepository<'_> {
    fn write_archive(&self, archive: &ArchiveRecord) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO archives (date, created_at, item_count)
             VALUES (?1, ?2, ?3);",
            params![
                date_to_db(archive.date),
                datetime_to_db(archive.created_at),
                archive.item_count,
            ],
        )?;

        if inserted == 0 {
            return Ok(false);
        }

        for item in &archive.items {
            self.conn.execute(
                "INSERT INTO archive_items (id, archive_date, text, completed_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    Uuid::new_v4().to_string(),
                    date_to_db(archive.date),
                    item.text.as_str(),
                    item.completed_at.map(datetime_to_db),
                ],
            )?;
        }

        Ok(true)
    }

    fn get_archive(&self, date: NaiveDate) -> RepoResult<Option<ArchiveRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, created_at, item_count
             FROM archives
             WHERE date = ?1;",
        )?;

        let mut rows = stmt.query([date_to_db(date)])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let date_text: String = row.get("date")?;
        let mut archive = ArchiveRecord {
            date: parse_db_date("archives.date", &date_text)?,
            created_at: parse_db_datetime("archives.created_at", row.get("created_at")?)?,
            item_count: row.get("item_count")?,
            items: Vec::new(),
        };

        let mut stmt = self.conn.prepare(
            "SELECT text, completed_at
             FROM archive_items
             WHERE archive_date = ?1
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([date_to_db(date)])?;
        while let Some(row) = rows.next()? {
            let completed_at = match row.get::<_, Option<i64>>("completed_at")? {
                Some(value) => Some(parse_db_datetime("archive_items.completed_at", value)?),
                None => None,
            };
            archive.items.push(ArchivedItem {
                text: row.get("text")?,
                completed_at,
            });
        }

        Ok(Some(archive))
    }
}
