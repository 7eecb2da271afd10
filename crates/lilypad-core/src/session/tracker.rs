//! Session tracker implementation.
//!
//! Tracks which habit is active, whether the clock is running and how many
//! seconds the current session has accumulated. It has no clock of its own:
//! the caller delivers one `tick()` per elapsed second (see [`super::Ticker`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Idle
//!           ^ track (flush + restart)
//! ```
//!
//! Seconds leave the tracker only through a flush, which happens on `stop`
//! and when `track` replaces a session. The flush credits the habit before
//! the counter is zeroed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::events::{Event, SessionFlush};
use crate::habit::HabitRepository;
use crate::storage::KvStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTracker {
    active_habit_id: Option<String>,
    is_running: bool,
    elapsed_secs: u64,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn active_habit_id(&self) -> Option<&str> {
        self.active_habit_id.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn state(&self) -> SessionState {
        match (&self.active_habit_id, self.is_running) {
            (None, _) => SessionState::Idle,
            (Some(_), true) => SessionState::Running,
            (Some(_), false) => SessionState::Paused,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot<S: KvStore>(&self, repo: &HabitRepository<S>) -> Event {
        let habit = self.active_habit_id().and_then(|id| repo.get(id));
        Event::StateSnapshot {
            active_habit_id: self.active_habit_id.clone(),
            active_habit_name: habit.map(|h| h.name.clone()),
            is_running: self.is_running,
            elapsed_secs: self.elapsed_secs,
            total_secs: habit
                .map(|h| h.time_spent.saturating_add(self.elapsed_secs))
                .unwrap_or(self.elapsed_secs),
            daily_goal_min: habit.map(|h| h.daily_goal).unwrap_or(0),
            goal_progress_pct: habit
                .map(|h| h.goal_progress_pct(self.elapsed_secs))
                .unwrap_or(0.0),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh running session on `habit_id`.
    ///
    /// Any open session is flushed first, including one on the same habit.
    ///
    /// # Errors
    /// [`CoreError::HabitNotFound`] if the habit is not in `repo`; the open
    /// session is left untouched. Storage errors from the flush are returned
    /// after the seconds have been credited in memory.
    pub fn track<S: KvStore>(
        &mut self,
        repo: &mut HabitRepository<S>,
        habit_id: &str,
    ) -> Result<Event> {
        if !repo.contains(habit_id) {
            return Err(CoreError::HabitNotFound(habit_id.to_string()));
        }
        let previous = self.flush(repo)?;
        self.active_habit_id = Some(habit_id.to_string());
        self.is_running = true;
        self.elapsed_secs = 0;
        tracing::debug!(habit_id, "session started");
        Ok(Event::SessionStarted {
            habit_id: habit_id.to_string(),
            previous,
            at: Utc::now(),
        })
    }

    /// Stop the clock without flushing.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        let habit_id = self.active_habit_id.clone()?;
        tracing::debug!(habit_id = %habit_id, elapsed_secs = self.elapsed_secs, "session paused");
        Some(Event::SessionPaused {
            habit_id,
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Restart the clock of a paused session. No-op without an active habit.
    pub fn resume(&mut self) -> Option<Event> {
        let habit_id = self.active_habit_id.clone()?;
        if self.is_running {
            return None;
        }
        self.is_running = true;
        tracing::debug!(habit_id = %habit_id, elapsed_secs = self.elapsed_secs, "session resumed");
        Some(Event::SessionResumed {
            habit_id,
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Flush the session and return to idle. No-op when idle.
    pub fn stop<S: KvStore>(&mut self, repo: &mut HabitRepository<S>) -> Result<Option<Event>> {
        if self.active_habit_id.is_none() {
            self.is_running = false;
            return Ok(None);
        }
        self.is_running = false;
        let flushed = self.flush(repo);
        self.active_habit_id = None;
        let flush = flushed?;
        tracing::debug!("session stopped");
        Ok(flush.map(|flush| Event::SessionStopped {
            flush,
            at: Utc::now(),
        }))
    }

    /// Count one second. Returns `false` (and counts nothing) unless running.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.active_habit_id.is_none() {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Credit the elapsed seconds to the active habit, then zero the counter.
    ///
    /// The counter is zeroed even when persisting fails: the repository has
    /// already applied the credit in memory.
    fn flush<S: KvStore>(&mut self, repo: &mut HabitRepository<S>) -> Result<Option<SessionFlush>> {
        let Some(habit_id) = self.active_habit_id.clone() else {
            self.elapsed_secs = 0;
            return Ok(None);
        };
        let secs = self.elapsed_secs;
        let credited = repo.credit(&habit_id, secs);
        self.elapsed_secs = 0;
        Ok(Some(SessionFlush {
            habit_id,
            flushed_secs: secs,
            time_spent: credited?,
        }))
    }
}
