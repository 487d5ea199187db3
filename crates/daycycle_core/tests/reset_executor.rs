use chrono::{NaiveDate, NaiveDateTime};
use daycycle_core::db::open_db_in_memory;
use daycycle_core::model::archive::{ArchiveRecord, ArchivedItem};
use daycycle_core::repo::archive_repo::{ArchiveRepository, SqliteArchiveRepository};
use daycycle_core::repo::checklist_repo::{ChecklistRepository, SqliteChecklistRepository};
use daycycle_core::repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
use daycycle_core::repo::reset_repo::{ResetStateRepository, SqliteResetStateRepository};
use daycycle_core::repo::todo_repo::{SqliteTodoRepository, TodoRepository};
use daycycle_core::{
    ChecklistItem, ChecklistTemplate, Clock, Meeting, RepoError, RepoResult, ResetBookkeeping,
    ResetCompleteEvent, ResetEngine, ResetKind, ResetObserver, ResetPhase, ResetReason,
    ResetSettings, ResetStores, TodoItem,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

struct FixedClock(NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

fn date(text: &str) -> NaiveDate {
    text.parse().unwrap()
}

fn at(text: &str) -> NaiveDateTime {
    text.parse().unwrap()
}

fn with_stores<F>(conn: &Connection, f: F)
where
    F: FnOnce(ResetStores<'_>),
{
    let checklist = SqliteChecklistRepository::new(conn);
    let todos = SqliteTodoRepository::new(conn);
    let meetings = SqliteMeetingRepository::new(conn);
    let archives = SqliteArchiveRepository::new(conn);
    let state = SqliteResetStateRepository::new(conn);
    f(ResetStores {
        checklist: &checklist,
        todos: &todos,
        meetings: &meetings,
        archives: &archives,
        state: &state,
    });
}

fn seed_last_reset(conn: &Connection, last_reset: &str) {
    let state = SqliteResetStateRepository::new(conn);
    state
        .save_bookkeeping(&ResetBookkeeping {
            last_reset_date: Some(date(last_reset)),
            last_reset_at: Some(at(&format!("{last_reset}T00:00:05"))),
            reset_time_changed_at: None,
        })
        .unwrap();
}

#[test]
fn two_missed_days_collapse_into_one_catch_up_run() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-01");

    let clock = FixedClock(at("2024-01-03T01:00:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());

        let summary = engine.check_and_reset(None).expect("reset should be due");
        assert_eq!(summary.reason, ResetReason::CatchUp);
        assert_eq!(summary.kind, ResetKind::Automatic);
        assert_eq!(summary.date, date("2024-01-03"));
        assert!(summary.fully_succeeded());

        let bookkeeping = stores.state.load_bookkeeping().unwrap();
        assert_eq!(bookkeeping.last_reset_date, Some(date("2024-01-03")));

        let history = stores.state.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, date("2024-01-03"));
        assert_eq!(history[0].reason, ResetReason::CatchUp);

        // Immediately re-checking finds nothing left to do.
        assert!(engine.check_and_reset(None).is_none());
        assert_eq!(stores.state.history().unwrap().len(), 1);
    });
}

#[test]
fn bootstrap_run_materializes_without_archiving() {
    let conn = open_db_in_memory().unwrap();

    {
        let checklist = SqliteChecklistRepository::new(&conn);
        checklist
            .create_template(&ChecklistTemplate::new("plan day", 0))
            .unwrap();
    }

    let clock = FixedClock(at("2024-01-03T08:00:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());

        let summary = engine.check_and_reset(None).expect("bootstrap reset");
        assert_eq!(summary.reason, ResetReason::Bootstrap);
        assert_eq!(summary.archived_items, 0);
        assert_eq!(summary.created_items, 1);

        let items = stores
            .checklist
            .list_items_for_date(date("2024-01-03"))
            .unwrap();
        assert_eq!(items.len(), 1);
    });
}

#[test]
fn run_archives_previous_day_completed_items_only() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    {
        let checklist = SqliteChecklistRepository::new(&conn);
        let mut item = ChecklistItem {
            id: Uuid::new_v4(),
            date: date("2024-01-02"),
            text: "review calendar".to_string(),
            completed: false,
            completed_at: None,
            template_id: None,
            order: 0,
            recurring: false,
        };
        checklist.create_item(&item).unwrap();

        // Completed during the day through the normal save path.
        item.completed = true;
        item.completed_at = Some(at("2024-01-02T09:30:00"));
        checklist.save_item(&item).unwrap();

        item.id = Uuid::new_v4();
        item.text = "clear inbox".to_string();
        item.completed = false;
        item.completed_at = None;
        checklist.create_item(&item).unwrap();
    }

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());

        let summary = engine.check_and_reset(None).expect("reset should run");
        assert_eq!(summary.archived_items, 1);

        let archive = stores
            .archives
            .get_archive(date("2024-01-02"))
            .unwrap()
            .expect("archive should exist");
        assert_eq!(archive.item_count, 2);
        assert_eq!(archive.items.len(), 1);
        assert_eq!(archive.items[0].text, "review calendar");
        assert_eq!(archive.items[0].completed_at, Some(at("2024-01-02T09:30:00")));
    });
}

#[test]
fn archive_for_a_date_is_write_once() {
    let conn = open_db_in_memory().unwrap();
    let archives = SqliteArchiveRepository::new(&conn);

    let archive = ArchiveRecord {
        date: date("2024-01-02"),
        created_at: at("2024-01-03T00:00:10"),
        item_count: 3,
        items: vec![ArchivedItem {
            text: "review calendar".to_string(),
            completed_at: None,
        }],
    };

    assert!(archives.write_archive(&archive).unwrap());

    let mut second = archive.clone();
    second.item_count = 99;
    assert!(!archives.write_archive(&second).unwrap());

    let stored = archives.get_archive(date("2024-01-02")).unwrap().unwrap();
    assert_eq!(stored.item_count, 3);
    assert_eq!(stored.items.len(), 1);
}

#[test]
fn run_clears_today_meeting_completion_but_keeps_notes() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    let meeting_id;
    let other_day_id;
    {
        let meetings = SqliteMeetingRepository::new(&conn);
        let mut meeting = Meeting::new("weekly sync", date("2024-01-03"));
        meeting.completed = true;
        meeting.completed_at = Some(at("2024-01-03T00:10:00"));
        meeting_id = meetings.create_meeting(&meeting).unwrap();

        // Notes edited after creation must survive the reset.
        meeting.notes = "decisions: ship it".to_string();
        meetings.save_meeting(&meeting).unwrap();

        let mut earlier = Meeting::new("retro", date("2024-01-02"));
        earlier.completed = true;
        earlier.completed_at = Some(at("2024-01-02T15:00:00"));
        other_day_id = meetings.create_meeting(&earlier).unwrap();
    }

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());
        let summary = engine.check_and_reset(None).expect("reset should run");
        assert_eq!(summary.meetings_reset, 1);

        let meeting = stores.meetings.get_meeting(meeting_id).unwrap().unwrap();
        assert!(!meeting.completed);
        assert_eq!(meeting.completed_at, None);
        assert_eq!(meeting.notes, "decisions: ship it");

        // Meetings on other days are untouched.
        let earlier = stores.meetings.get_meeting(other_day_id).unwrap().unwrap();
        assert!(earlier.completed);

        let today_meetings = stores.meetings.list_for_date(date("2024-01-03")).unwrap();
        assert_eq!(today_meetings.len(), 1);
        assert!(!today_meetings[0].completed);
    });
}

#[test]
fn run_carries_incomplete_todos_into_the_new_day() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    let todo_id;
    {
        let todos = SqliteTodoRepository::new(&conn);
        let todo = TodoItem::new("send invoice", date("2024-01-02"));
        todo_id = todos.create_todo(&todo).unwrap();
    }

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());
        let summary = engine.check_and_reset(None).expect("reset should run");
        assert_eq!(summary.carried_todos, 1);

        let todo = stores.todos.get_todo(todo_id).unwrap().unwrap();
        assert_eq!(todo.date, date("2024-01-03"));
        assert_eq!(todo.carried_from, Some(date("2024-01-02")));
    });
}

#[test]
fn failed_archiving_phase_does_not_block_later_phases() {
    struct BrokenArchives;

    impl ArchiveRepository for BrokenArchives {
        fn write_archive(&self, _archive: &ArchiveRecord) -> RepoResult<bool> {
            Err(RepoError::InvalidData("archive store unavailable".into()))
        }

        fn get_archive(&self, _date: NaiveDate) -> RepoResult<Option<ArchiveRecord>> {
            Err(RepoError::InvalidData("archive store unavailable".into()))
        }
    }

    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    {
        let checklist = SqliteChecklistRepository::new(&conn);
        checklist
            .create_template(&ChecklistTemplate::new("plan day", 0))
            .unwrap();

        let done = ChecklistItem {
            id: Uuid::new_v4(),
            date: date("2024-01-02"),
            text: "review calendar".to_string(),
            completed: true,
            completed_at: Some(at("2024-01-02T09:30:00")),
            template_id: None,
            order: 0,
            recurring: false,
        };
        checklist.create_item(&done).unwrap();

        let todos = SqliteTodoRepository::new(&conn);
        todos
            .create_todo(&TodoItem::new("send invoice", date("2024-01-02")))
            .unwrap();
    }

    let checklist = SqliteChecklistRepository::new(&conn);
    let todos = SqliteTodoRepository::new(&conn);
    let meetings = SqliteMeetingRepository::new(&conn);
    let archives = BrokenArchives;
    let state = SqliteResetStateRepository::new(&conn);
    let stores = ResetStores {
        checklist: &checklist,
        todos: &todos,
        meetings: &meetings,
        archives: &archives,
        state: &state,
    };

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    let engine = ResetEngine::new(&clock, stores, ResetSettings::default());

    let summary = engine.check_and_reset(None).expect("reset should run");
    assert!(!summary.fully_succeeded());
    assert!(summary
        .phase(ResetPhase::Archiving)
        .expect("archiving phase was attempted")
        .error
        .is_some());

    // Later phases still ran and bookkeeping still committed.
    assert_eq!(summary.created_items, 1);
    assert_eq!(summary.carried_todos, 1);
    assert!(summary
        .phase(ResetPhase::BookkeepingUpdate)
        .expect("bookkeeping phase was attempted")
        .succeeded());

    let bookkeeping = state.load_bookkeeping().unwrap();
    assert_eq!(bookkeeping.last_reset_date, Some(date("2024-01-03")));
    assert_eq!(state.history().unwrap().len(), 1);
}

#[test]
fn manual_run_appends_manual_history_entry() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-03");

    let clock = FixedClock(at("2024-01-03T12:00:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());
        let summary = engine.run_manual();
        assert_eq!(summary.kind, ResetKind::Manual);
        assert_eq!(summary.reason, ResetReason::Manual);

        let history = stores.state.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, ResetKind::Manual);
    });
}

#[test]
fn observers_receive_the_completion_event() {
    struct Recorder(Rc<RefCell<Vec<ResetCompleteEvent>>>);

    impl ResetObserver for Recorder {
        fn on_reset_complete(&self, event: &ResetCompleteEvent) {
            self.0.borrow_mut().push(*event);
        }
    }

    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    with_stores(&conn, |stores| {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut engine = ResetEngine::new(&clock, stores, ResetSettings::default());
        engine.subscribe(Box::new(Recorder(Rc::clone(&events))));

        engine.check_and_reset(None).expect("reset should run");

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, date("2024-01-03"));
        assert_eq!(events[0].timestamp, at("2024-01-03T00:30:00"));
    });
}

#[test]
fn rerunning_the_executor_does_not_duplicate_checklist_items() {
    let conn = open_db_in_memory().unwrap();
    seed_last_reset(&conn, "2024-01-02");

    {
        let checklist = SqliteChecklistRepository::new(&conn);
        checklist
            .create_template(&ChecklistTemplate::new("plan day", 0))
            .unwrap();
        checklist
            .create_template(&ChecklistTemplate::new("clear inbox", 1))
            .unwrap();
    }

    let clock = FixedClock(at("2024-01-03T00:30:00"));
    with_stores(&conn, |stores| {
        let engine = ResetEngine::new(&clock, stores, ResetSettings::default());
        engine.check_and_reset(None).expect("first run");
        // A manual rerun on the same day must not duplicate today's items.
        engine.run_manual();

        let items = stores
            .checklist
            .list_items_for_date(date("2024-01-03"))
            .unwrap();
        assert_eq!(items.len(), 2);
    });
}
