//! Checklist repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist checklist templates and daily checklist instances.
//! - Provide the materialization and pruning queries the reset engine needs.
//!
//! # Invariants
//! - Templates are never deleted by any operation on this repository.
//! - `delete_generated_for_date` and `prune_generated_before` only touch
//!   daily copies (`recurring = 0`), never recurring custom sources.

use crate::model::checklist::{ChecklistItem, ChecklistTemplate};
use crate::model::RecordId;
use crate::repo::{
    bool_to_int, date_to_db, datetime_to_db, parse_db_bool, parse_db_date, parse_db_datetime,
    parse_db_uuid, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    date,
    text,
    completed,
    completed_at,
    template_id,
    display_order,
    recurring
FROM checklist_items";

const TEMPLATE_SELECT_SQL: &str = "SELECT
    id,
    text,
    display_order,
    category,
    active
FROM checklist_templates";

/// Repository interface for checklist templates and daily items.
pub trait ChecklistRepository {
    /// Creates one template. User-facing; the engine itself never calls it.
    fn create_template(&self, template: &ChecklistTemplate) -> RepoResult<RecordId>;
    /// Lists templates eligible for materialization, ordered for display.
    fn list_active_templates(&self) -> RepoResult<Vec<ChecklistTemplate>>;
    /// Creates one daily checklist item.
    fn create_item(&self, item: &ChecklistItem) -> RepoResult<RecordId>;
    /// Upserts one daily checklist item by id.
    fn save_item(&self, item: &ChecklistItem) -> RepoResult<()>;
    /// Lists all items for one calendar day, ordered for display.
    fn list_items_for_date(&self, date: NaiveDate) -> RepoResult<Vec<ChecklistItem>>;
    /// Lists recurring custom sources created before the given day.
    fn list_recurring_sources(&self, before: NaiveDate) -> RepoResult<Vec<ChecklistItem>>;
    /// Deletes daily copies for one day. Returns the deleted row count.
    fn delete_generated_for_date(&self, date: NaiveDate) -> RepoResult<usize>;
    /// Deletes daily copies dated before the cutoff. Returns the deleted row count.
    fn prune_generated_before(&self, cutoff: NaiveDate) -> RepoResult<usize>;
}

/// SQLite-backed checklist repository.
pub struct SqliteChecklistRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChecklistRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ChecklistRepository for SqliteChecklistRepository<'_> {
    fn create_template(&self, template: &ChecklistTemplate) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO checklist_templates (id, text, display_order, category, active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                template.id.to_string(),
                template.text.as_str(),
                template.order,
                template.category.as_deref(),
                bool_to_int(template.active),
            ],
        )?;

        Ok(template.id)
    }

    fn list_active_templates(&self) -> RepoResult<Vec<ChecklistTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TEMPLATE_SELECT_SQL}
             WHERE active = 1
             ORDER BY display_order ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }

        Ok(templates)
    }

    fn create_item(&self, item: &ChecklistItem) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO checklist_items (
                id,
                date,
                text,
                completed,
                completed_at,
                template_id,
                display_order,
                recurring
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                item.id.to_string(),
                date_to_db(item.date),
                item.text.as_str(),
                bool_to_int(item.completed),
                item.completed_at.map(datetime_to_db),
                item.template_id.map(|id| id.to_string()),
                item.order,
                bool_to_int(item.recurring),
            ],
        )?;

        Ok(item.id)
    }

    fn save_item(&self, item: &ChecklistItem) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE checklist_items
             SET
                date = ?2,
                text = ?3,
                completed = ?4,
                completed_at = ?5,
                template_id = ?6,
                display_order = ?7,
                recurring = ?8
             WHERE id = ?1;",
            params![
                item.id.to_string(),
                date_to_db(item.date),
                item.text.as_str(),
                bool_to_int(item.completed),
                item.completed_at.map(datetime_to_db),
                item.template_id.map(|id| id.to_string()),
                item.order,
                bool_to_int(item.recurring),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.id));
        }

        Ok(())
    }

    fn list_items_for_date(&self, date: NaiveDate) -> RepoResult<Vec<ChecklistItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE date = ?1
             ORDER BY display_order ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([date_to_db(date)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn list_recurring_sources(&self, before: NaiveDate) -> RepoResult<Vec<ChecklistItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE recurring = 1
               AND date < ?1
             ORDER BY display_order ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([date_to_db(before)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn delete_generated_for_date(&self, date: NaiveDate) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM checklist_items
             WHERE date = ?1
               AND recurring = 0;",
            [date_to_db(date)],
        )?;

        Ok(deleted)
    }

    fn prune_generated_before(&self, cutoff: NaiveDate) -> RepoResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM checklist_items
             WHERE date < ?1
               AND recurring = 0;",
            [date_to_db(cutoff)],
        )?;

        Ok(deleted)
    }
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<ChecklistTemplate> {
    let id_text: String = row.get("id")?;
    let active = parse_db_bool("checklist_templates.active", row.get("active")?)?;

    Ok(ChecklistTemplate {
        id: parse_db_uuid("checklist_templates.id", &id_text)?,
        text: row.get("text")?,
        order: row.get("display_order")?,
        category: row.get("category")?,
        active,
    })
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ChecklistItem> {
    let id_text: String = row.get("id")?;
    let date_text: String = row.get("date")?;

    let template_id = match row.get::<_, Option<String>>("template_id")? {
        Some(value) => Some(parse_db_uuid("checklist_items.template_id", &value)?),
        None => None,
    };
    let completed_at = match row.get::<_, Option<i64>>("completed_at")? {
        Some(value) => Some(parse_db_datetime("checklist_items.completed_at", value)?),
        None => None,
    };

    Ok(ChecklistItem {
        id: parse_db_uuid("checklist_items.id", &id_text)?,
        date: parse_db_date("checklist_items.date", &date_text)?,
        text: row.get("text")?,
        completed: parse_db_bool("checklist_items.completed", row.get("completed")?)?,
        completed_at,
        template_id,
        order: row.get("display_order")?,
        recurring: parse_db_bool("checklist_items.recurring", row.get("recurring")?)?,
    })
}
