//! Meeting repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist meetings and expose the per-day completion queries the reset
//!   engine needs.
//!
//! # Invariants
//! - No operation on this repository ever rewrites `notes`; the reset path
//!   only clears completion state.

use crate::model::meeting::Meeting;
use crate::model::RecordId;
use crate::repo::{
    bool_to_int, date_to_db, datetime_to_db, parse_db_bool, parse_db_date, parse_db_datetime,
    parse_db_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const MEETING_SELECT_SQL: &str = "SELECT
    id,
    title,
    date,
    completed,
    completed_at,
    notes
FROM meetings";

/// Repository interface for meeting persistence.
pub trait MeetingRepository {
    /// Creates one meeting.
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<RecordId>;
    /// Upserts one meeting by id.
    fn save_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    /// Gets one meeting by id.
    fn get_meeting(&self, id: RecordId) -> RepoResult<Option<Meeting>>;
    /// Lists all meetings for one calendar day.
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Meeting>>;
    /// Lists completed meetings for one calendar day.
    fn list_completed_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Meeting>>;
    /// Clears completion state for one meeting, leaving notes untouched.
    fn clear_completion(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed meeting repository.
pub struct SqliteMeetingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MeetingRepository for SqliteMeetingRepository<'_> {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO meetings (id, title, date, completed, completed_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                meeting.id.to_string(),
                meeting.title.as_str(),
                date_to_db(meeting.date),
                bool_to_int(meeting.completed),
                meeting.completed_at.map(datetime_to_db),
                meeting.notes.as_str(),
            ],
        )?;

        Ok(meeting.id)
    }

    fn save_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET
                title = ?2,
                date = ?3,
                completed = ?4,
                completed_at = ?5,
                notes = ?6
             WHERE id = ?1;",
            params![
                meeting.id.to_string(),
                meeting.title.as_str(),
                date_to_db(meeting.date),
                bool_to_int(meeting.completed),
                meeting.completed_at.map(datetime_to_db),
                meeting.notes.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(meeting.id));
        }

        Ok(())
    }

    fn get_meeting(&self, id: RecordId) -> RepoResult<Option<Meeting>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEETING_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meeting_row(row)?));
        }

        Ok(None)
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL}
             WHERE date = ?1
             ORDER BY title ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([date_to_db(date)])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            meetings.push(parse_meeting_row(row)?);
        }

        Ok(meetings)
    }

    fn list_completed_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL}
             WHERE date = ?1
               AND completed = 1
             ORDER BY title ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([date_to_db(date)])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            meetings.push(parse_meeting_row(row)?);
        }

        Ok(meetings)
    }

    fn clear_completion(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET
                completed = 0,
                completed_at = NULL
             WHERE id = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_meeting_row(row: &Row<'_>) -> RepoResult<Meeting> {
    let id_text: String = row.get("id")?;
    let date_text: String = row.get("date")?;

    let completed_at = match row.get::<_, Option<i64>>("completed_at")? {
        Some(value) => Some(parse_db_datetime("meetings.completed_at", value)?),
        None => None,
    };

    Ok(Meeting {
        id: parse_db_uuid("meetings.id", &id_text)?,
        title: row.get("title")?,
        date: parse_db_date("meetings.date", &date_text)?,
        completed: parse_db_bool("meetings.completed", row.get("completed")?)?,
        completed_at,
        notes: row.get("notes")?,
    })
}
