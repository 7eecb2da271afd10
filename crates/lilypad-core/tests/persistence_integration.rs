//! Integration tests for habit persistence across reloads and store failures.

use std::cell::Cell;

use lilypad_core::{
    CoreError, Database, DatabaseError, HabitRepository, KvStore, MemoryStore, SessionTracker,
};

/// Store whose writes can be switched off to simulate a full disk.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Cell<bool>,
}

impl KvStore for FlakyStore {
    fn get(&self, key: &str) -> lilypad_core::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> lilypad_core::Result<()> {
        if self.fail_writes.get() {
            return Err(DatabaseError::QueryFailed("disk full".into()).into());
        }
        self.inner.set(key, value)
    }
}

#[test]
fn habits_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lilypad.db");

    let id = {
        let db = Database::open_at(&path).unwrap();
        let mut repo = HabitRepository::load(db, "habits");
        repo.add("Read", 30).unwrap();
        repo.add("Run", 20).unwrap();
        let id = repo.list()[0].id.clone();

        let mut tracker = SessionTracker::new();
        tracker.track(&mut repo, &id).unwrap();
        for _ in 0..42 {
            tracker.tick();
        }
        tracker.stop(&mut repo).unwrap();
        id
    };

    let repo = HabitRepository::load(Database::open_at(&path).unwrap(), "habits");
    assert_eq!(repo.list().len(), 2);
    assert_eq!(repo.list()[0].id, id);
    assert_eq!(repo.list()[0].time_spent, 42);
    assert_eq!(repo.list()[1].name, "Run");
}

#[test]
fn corrupt_value_in_database_starts_empty() {
    let db = Database::open_memory().unwrap();
    db.kv_set("habits", "not json").unwrap();
    let mut repo = HabitRepository::load(db, "habits");
    assert!(repo.list().is_empty());

    // The next mutation overwrites the corrupt value.
    repo.add("Read", 30).unwrap();
    let raw = repo.store().kv_get("habits").unwrap().unwrap();
    assert!(raw.contains("\"dailyGoal\":30"));
}

#[test]
fn separate_keys_hold_separate_lists() {
    let store = MemoryStore::new();
    let mut work = HabitRepository::load(&store, "work");
    work.add("Deep work", 120).unwrap();
    let mut home = HabitRepository::load(&store, "home");
    home.add("Piano", 20).unwrap();

    assert_eq!(HabitRepository::load(&store, "work").list().len(), 1);
    assert_eq!(HabitRepository::load(&store, "home").list()[0].name, "Piano");
}

#[test]
fn failed_write_keeps_seconds_in_memory() {
    let mut repo = HabitRepository::load(FlakyStore::default(), "habits");
    repo.add("Read", 30).unwrap();
    let id = repo.list()[0].id.clone();

    let mut tracker = SessionTracker::new();
    tracker.track(&mut repo, &id).unwrap();
    for _ in 0..7 {
        tracker.tick();
    }

    repo.store().fail_writes.set(true);
    let err = tracker.stop(&mut repo).unwrap_err();
    assert!(matches!(err, CoreError::Database(_)));
    assert_eq!(repo.get(&id).unwrap().time_spent, 7);
    assert_eq!(tracker.elapsed_secs(), 0);
    assert_eq!(tracker.active_habit_id(), None);

    // Once the store recovers, the next write carries the credited seconds.
    repo.store().fail_writes.set(false);
    repo.edit(&id, "Read", 30).unwrap();
    let reloaded = HabitRepository::load(&repo.store().inner, "habits");
    assert_eq!(reloaded.list()[0].time_spent, 7);
}
