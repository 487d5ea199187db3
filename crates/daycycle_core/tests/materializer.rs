use chrono::NaiveDate;
use daycycle_core::db::open_db_in_memory;
use daycycle_core::engine::materializer::materialize_today;
use daycycle_core::repo::checklist_repo::{ChecklistRepository, SqliteChecklistRepository};
use daycycle_core::{ChecklistItem, ChecklistTemplate};
use uuid::Uuid;

fn date(text: &str) -> NaiveDate {
    text.parse().unwrap()
}

fn recurring_source(text: &str, day: &str, order: i64) -> ChecklistItem {
    ChecklistItem {
        id: Uuid::new_v4(),
        date: date(day),
        text: text.to_string(),
        completed: false,
        completed_at: None,
        template_id: None,
        order,
        recurring: true,
    }
}

#[test]
fn templates_and_recurring_sources_each_yield_one_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChecklistRepository::new(&conn);

    repo.create_template(&ChecklistTemplate::new("review calendar", 0))
        .unwrap();
    repo.create_template(&ChecklistTemplate::new("clear inbox", 1))
        .unwrap();
    repo.create_item(&recurring_source("water plants", "2024-05-20", 2))
        .unwrap();

    let today = date("2024-06-01");
    let created = materialize_today(&repo, today).unwrap();
    assert_eq!(created, 3);

    let items = repo.list_items_for_date(today).unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| !item.completed));
    assert!(items.iter().all(|item| item.template_id.is_some()));
    assert!(items.iter().all(|item| !item.recurring));
}

#[test]
fn rerunning_for_the_same_day_does_not_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChecklistRepository::new(&conn);

    repo.create_template(&ChecklistTemplate::new("review calendar", 0))
        .unwrap();
    repo.create_template(&ChecklistTemplate::new("clear inbox", 1))
        .unwrap();

    let today = date("2024-06-01");
    let first = materialize_today(&repo, today).unwrap();
    let second = materialize_today(&repo, today).unwrap();
    assert_eq!(first, second);
    assert_eq!(repo.list_items_for_date(today).unwrap().len(), 2);
}

#[test]
fn inactive_templates_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChecklistRepository::new(&conn);

    let mut paused = ChecklistTemplate::new("morning run", 0);
    paused.active = false;
    repo.create_template(&paused).unwrap();
    repo.create_template(&ChecklistTemplate::new("plan day", 1))
        .unwrap();

    let today = date("2024-06-01");
    assert_eq!(materialize_today(&repo, today).unwrap(), 1);
    assert_eq!(repo.list_items_for_date(today).unwrap()[0].text, "plan day");
}

#[test]
fn materialized_items_preserve_source_order_and_back_reference() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChecklistRepository::new(&conn);

    let template = ChecklistTemplate {
        id: Uuid::new_v4(),
        text: "deep work block".to_string(),
        order: 7,
        category: Some("focus".to_string()),
        active: true,
    };
    repo.create_template(&template).unwrap();

    let today = date("2024-06-01");
    materialize_today(&repo, today).unwrap();

    let items = repo.list_items_for_date(today).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].order, 7);
    assert_eq!(items[0].template_id, Some(template.id));
}

#[test]
fn recurring_sources_survive_regeneration() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteChecklistRepository::new(&conn);

    let source = recurring_source("water plants", "2024-05-20", 0);
    repo.create_item(&source).unwrap();

    let today = date("2024-06-01");
    materialize_today(&repo, today).unwrap();
    materialize_today(&repo, today).unwrap();

    let sources = repo.list_recurring_sources(today).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].id, source.id);

    let copies = repo.list_items_for_date(today).unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].template_id, Some(source.id));
}
