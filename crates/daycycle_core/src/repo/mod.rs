//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contracts the reset engine phases run against.
//! - Isolate SQLite query details from engine orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod archive_repo;
pub mod checklist_repo;
pub mod meeting_repo;
pub mod reset_repo;
pub mod todo_repo;

use crate::db::DbError;
use crate::model::RecordId;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for tracker persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_db_date(column: &str, value: &str) -> RepoResult<NaiveDate> {
    value
        .parse()
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

pub(crate) fn datetime_to_db(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

pub(crate) fn parse_db_datetime(column: &str, value: i64) -> RepoResult<NaiveDateTime> {
    DateTime::from_timestamp_millis(value)
        .map(|instant| instant.naive_utc())
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid timestamp value `{value}` in {column}"))
        })
}

pub(crate) fn parse_db_uuid(column: &str, value: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_db_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
