//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist todos and expose the carryforward selection query.
//! - Own the retention deletion rule for completed todos.
//!
//! # Invariants
//! - Carry candidates are incomplete, opted in, dated before today and
//!   within the carry window; today's todos are never selected.
//! - Retention pruning never deletes an incomplete todo.

use crate::model::todo::{Priority, TodoItem};
use crate::model::RecordId;
use crate::repo::{
    bool_to_int, date_to_db, parse_db_bool, parse_db_date, parse_db_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    text,
    date,
    completed,
    priority,
    carry_forward,
    carried_from,
    carry_count,
    auto_promoted
FROM todos";

/// Repository interface for todo persistence.
pub trait TodoRepository {
    /// Creates one todo.
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<RecordId>;
    /// Upserts one todo by id.
    fn save_todo(&self, todo: &TodoItem) -> RepoResult<()>;
    /// Gets one todo by id.
    fn get_todo(&self, id: RecordId) -> RepoResult<Option<TodoItem>>;
    /// Lists all todos active on one calendar day.
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<TodoItem>>;
    /// Lists todos eligible for carryforward into `today`.
    ///
    /// Selection: incomplete, `carry_forward = true`, dated before `today`
    /// and on/after `cutoff`.
    fn list_carry_candidates(
        &self,
        today: NaiveDate,
        cutoff: NaiveDate,
    ) -> RepoResult<Vec<TodoItem>>;
    /// Deletes completed todos dated before the cutoff. Returns the count.
    fn prune_completed_before(&self, cutoff: NaiveDate) -> RepoResult<usize>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO todos (
                id,
                text,
                date,
                completed,
                priority,
                carry_forward,
                carried_from,
                carry_count,
                auto_promoted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                todo.id.to_string(),
                todo.text.as_str(),
                date_to_db(todo.date),
                bool_to_int(todo.completed),
                priority_to_db(todo.priority),
                bool_to_int(todo.carry_forward),
                todo.carried_from.map(date_to_db),
                todo.carry_count,
                bool_to_int(todo.auto_promoted),
            ],
        )?;

        Ok(todo.id)
    }

    fn save_todo(&self, todo: &TodoItem) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET
                text = ?2,
                date = ?3,
                completed = ?4,
                priority = ?5,
                carry_forward = ?6,
                carried_from = ?7,
                carry_count = ?8,
                auto_promoted = ?9
             WHERE id = ?1;",
            params![
                todo.id.to_string(),
                todo.text.as_str(),
                date_to_db(todo.date),
                bool_to_int(todo.completed),
                priority_to_db(todo.priority),
                bool_to_int(todo.carry_forward),
                todo.carried_from.map(date_to_db),
                todo.carry_count,
                bool_to_int(todo.auto_promoted),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        Ok(())
    }

    fn get_todo(&self, id: RecordId) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE date = ?1
             ORDER BY completed ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([date_to_db(date)])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn list_carry_candidates(
        &self,
        today: NaiveDate,
        cutoff: NaiveDate,
    ) -> RepoResult<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE completed = 0
               AND carry_forward = 1
               AND date < ?1
               AND date >= ?2
             ORDER BY date ASC, id ASC;"
        ))?;

        let mut rows = stmt.query(params![date_to_db(today), date_to_db(cutoff)])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn prune_completed_before(&self, cutoff: NaiveDate) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM todos
             WHERE completed = 1
               AND date < ?1;",
            [date_to_db(cutoff)],
        )?;

        Ok(deleted)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    let id_text: String = row.get("id")?;
    let date_text: String = row.get("date")?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in todos.priority"
        ))
    })?;

    let carried_from = match row.get::<_, Option<String>>("carried_from")? {
        Some(value) => Some(parse_db_date("todos.carried_from", &value)?),
        None => None,
    };

    Ok(TodoItem {
        id: parse_db_uuid("todos.id", &id_text)?,
        text: row.get("text")?,
        date: parse_db_date("todos.date", &date_text)?,
        completed: parse_db_bool("todos.completed", row.get("completed")?)?,
        priority,
        carry_forward: parse_db_bool("todos.carry_forward", row.get("carry_forward")?)?,
        carried_from,
        carry_count: row.get("carry_count")?,
        auto_promoted: parse_db_bool("todos.auto_promoted", row.get("auto_promoted")?)?,
    })
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}
