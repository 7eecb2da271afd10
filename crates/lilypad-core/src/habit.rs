//! Habits and the repository that keeps them persisted.
//!
//! The repository holds the whole list in memory and rewrites the full
//! serialized list to its [`KvStore`] after every mutation. Memory is
//! updated first, so a failed write is reported but never loses credited
//! seconds: the next successful write carries them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::session::SessionTracker;
use crate::storage::KvStore;

/// A trackable activity with a cumulative time budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    /// Target per day, in minutes.
    pub daily_goal: u32,
    /// Cumulative seconds across every session tracked for this habit.
    pub time_spent: u64,
}

impl Habit {
    pub fn daily_goal_secs(&self) -> u64 {
        u64::from(self.daily_goal) * 60
    }

    /// 0.0 .. 100.0 progress toward the daily goal, counting `pending_secs`
    /// of a session that has not been flushed yet.
    pub fn goal_progress_pct(&self, pending_secs: u64) -> f64 {
        let goal = self.daily_goal_secs();
        if goal == 0 {
            return 0.0;
        }
        let spent = self.time_spent.saturating_add(pending_secs) as f64;
        (spent * 100.0 / goal as f64).min(100.0)
    }
}

/// Form input for creating or editing a habit.
///
/// `id: None` creates a new habit, `Some(id)` edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub daily_goal: u32,
}

impl HabitDraft {
    pub fn new(name: impl Into<String>, daily_goal: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            daily_goal,
        }
    }

    pub fn editing(id: impl Into<String>, name: impl Into<String>, daily_goal: u32) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            daily_goal,
        }
    }

    /// Reject empty names and non-positive goals. Returns the trimmed name.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.daily_goal == 0 {
            return Err(ValidationError::InvalidValue {
                field: "dailyGoal".into(),
                message: "must be a positive number of minutes".into(),
            });
        }
        Ok(name)
    }
}

/// In-memory habit list mirrored to a key-value store.
pub struct HabitRepository<S> {
    store: S,
    key: String,
    habits: Vec<Habit>,
}

impl<S: KvStore> HabitRepository<S> {
    /// Read the list once from `store` under `key`.
    ///
    /// An absent, unreadable, or corrupt value yields an empty list.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let habits = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Habit>>(&raw) {
                Ok(habits) => habits,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "stored habit list is corrupt; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "habit store unavailable; starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = habits.len(), "loaded habits");
        Self { store, key, habits }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Habits in insertion order.
    pub fn list(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new habit with a fresh id and no time spent.
    pub fn add(&mut self, name: &str, daily_goal: u32) -> Result<Event> {
        let habit = Habit {
            id: self.fresh_id(),
            name: name.to_string(),
            daily_goal,
            time_spent: 0,
        };
        tracing::info!(id = %habit.id, name = %habit.name, daily_goal, "habit added");
        self.habits.push(habit.clone());
        self.persist()?;
        Ok(Event::HabitAdded {
            habit,
            at: Utc::now(),
        })
    }

    /// Change name and goal of an existing habit. `None` if `id` is unknown.
    pub fn edit(&mut self, id: &str, name: &str, daily_goal: u32) -> Result<Option<Event>> {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            tracing::debug!(id, "edit ignored: unknown habit");
            return Ok(None);
        };
        habit.name = name.to_string();
        habit.daily_goal = daily_goal;
        let habit = habit.clone();
        tracing::info!(id, name, daily_goal, "habit edited");
        self.persist()?;
        Ok(Some(Event::HabitUpdated {
            habit,
            at: Utc::now(),
        }))
    }

    /// Remove a habit. `None` if `id` is unknown.
    ///
    /// # Errors
    /// Refuses with [`CoreError::HabitActive`] while `tracker` has an open
    /// session on this habit; stop the session first so its seconds land.
    pub fn delete(&mut self, tracker: &SessionTracker, id: &str) -> Result<Option<Event>> {
        if tracker.active_habit_id() == Some(id) {
            return Err(CoreError::HabitActive(id.to_string()));
        }
        let Some(pos) = self.habits.iter().position(|h| h.id == id) else {
            tracing::debug!(id, "delete ignored: unknown habit");
            return Ok(None);
        };
        let habit = self.habits.remove(pos);
        tracing::info!(id, time_spent = habit.time_spent, "habit deleted");
        self.persist()?;
        Ok(Some(Event::HabitDeleted {
            habit,
            at: Utc::now(),
        }))
    }

    /// Add flushed session seconds to a habit's total.
    ///
    /// Returns the new total, or `None` when nothing was credited (zero
    /// seconds, or the habit no longer exists).
    pub fn credit(&mut self, id: &str, secs: u64) -> Result<Option<u64>> {
        if secs == 0 {
            return Ok(None);
        }
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == id) else {
            tracing::warn!(id, secs, "flush target vanished; seconds dropped");
            return Ok(None);
        };
        habit.time_spent = habit.time_spent.saturating_add(secs);
        let total = habit.time_spent;
        tracing::info!(id, secs, total, "session flushed");
        self.persist()?;
        Ok(Some(total))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.habits)?;
        self.store.set(&self.key, &json)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn repo() -> HabitRepository<MemoryStore> {
        HabitRepository::load(MemoryStore::new(), "habits")
    }

    fn stored(repo: &HabitRepository<MemoryStore>) -> Vec<Habit> {
        let raw = repo.store().get("habits").unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn add_creates_fresh_habit_and_persists() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        repo.add("Write", 20).unwrap();

        let habits = repo.list();
        assert_eq!(habits.len(), 2);
        assert_eq!(habits[0].name, "Read");
        assert_eq!(habits[0].daily_goal, 30);
        assert_eq!(habits[0].time_spent, 0);
        assert_ne!(habits[0].id, habits[1].id);
        assert_eq!(stored(&repo), habits);
    }

    #[test]
    fn edit_touches_only_name_and_goal() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        let id = repo.list()[0].id.clone();
        repo.credit(&id, 90).unwrap();

        let event = repo.edit(&id, "Read more", 45).unwrap();
        assert!(matches!(event, Some(Event::HabitUpdated { .. })));

        let habit = repo.get(&id).unwrap();
        assert_eq!(habit.id, id);
        assert_eq!(habit.name, "Read more");
        assert_eq!(habit.daily_goal, 45);
        assert_eq!(habit.time_spent, 90);
        assert_eq!(stored(&repo)[0], *habit);
    }

    #[test]
    fn edit_and_delete_unknown_id_are_noops() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        let tracker = SessionTracker::new();
        assert!(repo.edit("nope", "x", 1).unwrap().is_none());
        assert!(repo.delete(&tracker, "nope").unwrap().is_none());
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn delete_removes_and_persists() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        repo.add("Write", 20).unwrap();
        let id = repo.list()[0].id.clone();
        let tracker = SessionTracker::new();

        repo.delete(&tracker, &id).unwrap();
        assert_eq!(repo.list().len(), 1);
        assert_eq!(repo.list()[0].name, "Write");
        assert_eq!(stored(&repo).len(), 1);
    }

    #[test]
    fn delete_refuses_active_habit() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        let id = repo.list()[0].id.clone();
        let mut tracker = SessionTracker::new();
        tracker.track(&mut repo, &id).unwrap();

        let err = repo.delete(&tracker, &id).unwrap_err();
        assert!(matches!(err, CoreError::HabitActive(ref got) if *got == id));
        assert_eq!(repo.list().len(), 1);
    }

    #[test]
    fn credit_skips_zero_and_missing() {
        let mut repo = repo();
        repo.add("Read", 30).unwrap();
        let id = repo.list()[0].id.clone();
        assert_eq!(repo.credit(&id, 0).unwrap(), None);
        assert_eq!(repo.credit("gone", 5).unwrap(), None);
        assert_eq!(repo.credit(&id, 5).unwrap(), Some(5));
        assert_eq!(repo.credit(&id, 7).unwrap(), Some(12));
    }

    #[test]
    fn load_reads_existing_list_in_order() {
        let raw = r#"[
            {"id":"2024-01-01T00:00:00.000Z","name":"Read","dailyGoal":30,"timeSpent":120},
            {"id":"b","name":"Run","dailyGoal":20,"timeSpent":0}
        ]"#;
        let repo = HabitRepository::load(MemoryStore::with_entry("habits", raw), "habits");
        assert_eq!(repo.list().len(), 2);
        assert_eq!(repo.list()[0].time_spent, 120);
        assert_eq!(repo.list()[1].name, "Run");
    }

    #[test]
    fn load_falls_back_to_empty_on_corrupt_data() {
        let repo = HabitRepository::load(MemoryStore::with_entry("habits", "{oops"), "habits");
        assert!(repo.list().is_empty());
    }

    #[test]
    fn serialized_field_names_are_camel_case() {
        let habit = Habit {
            id: "a".into(),
            name: "Read".into(),
            daily_goal: 30,
            time_spent: 5,
        };
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["dailyGoal"], 30);
        assert_eq!(json["timeSpent"], 5);
    }

    #[test]
    fn goal_progress_counts_pending_and_caps() {
        let habit = Habit {
            id: "a".into(),
            name: "Read".into(),
            daily_goal: 1,
            time_spent: 30,
        };
        assert_eq!(habit.goal_progress_pct(0), 50.0);
        assert_eq!(habit.goal_progress_pct(15), 75.0);
        assert_eq!(habit.goal_progress_pct(600), 100.0);
    }

    #[test]
    fn draft_validation() {
        assert_eq!(HabitDraft::new("  Read ", 30).validate(), Ok("Read"));
        assert_eq!(
            HabitDraft::new("   ", 30).validate(),
            Err(ValidationError::EmptyName)
        );
        assert!(matches!(
            HabitDraft::new("Read", 0).validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
