//! Focus controller: the single owner of session and habit state.
//!
//! Presentation code holds one `FocusController` and feeds it intents. Each
//! intent maps onto one tracker or repository operation; afterwards the
//! controller keeps the [`Ticker`] in step with the tracker so ticks are only
//! produced while a session is running.

use crate::error::Result;
use crate::events::Event;
use crate::habit::{Habit, HabitDraft, HabitRepository};
use crate::session::{SessionTracker, Tick, Ticker};
use crate::storage::KvStore;

/// Yes/no question put to the user before destructive intents.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this habit?";

pub struct FocusController<S> {
    repo: HabitRepository<S>,
    tracker: SessionTracker,
    ticker: Ticker,
}

impl<S: KvStore> FocusController<S> {
    pub fn new(repo: HabitRepository<S>, ticker: Ticker) -> Self {
        Self {
            repo,
            tracker: SessionTracker::new(),
            ticker,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        self.repo.list()
    }

    pub fn repository(&self) -> &HabitRepository<S> {
        &self.repo
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn status(&self) -> Event {
        self.tracker.snapshot(&self.repo)
    }

    // ── Session intents ──────────────────────────────────────────────

    pub fn on_track(&mut self, habit_id: &str) -> Result<Event> {
        let event = self.tracker.track(&mut self.repo, habit_id);
        if event.is_ok() {
            // A restarted session gets a full first second.
            self.ticker.schedule();
        }
        self.sync_ticker();
        event
    }

    pub fn on_pause(&mut self) -> Option<Event> {
        let event = self.tracker.pause();
        self.sync_ticker();
        event
    }

    pub fn on_resume(&mut self) -> Option<Event> {
        let event = self.tracker.resume();
        self.sync_ticker();
        event
    }

    pub fn on_stop(&mut self) -> Result<Option<Event>> {
        let event = self.tracker.stop(&mut self.repo);
        self.sync_ticker();
        event
    }

    /// Count a tick if it belongs to the live schedule. Stale ticks queued
    /// before a cancel or reschedule are dropped.
    pub fn on_tick(&mut self, tick: Tick) -> bool {
        if !self.ticker.is_current(tick) {
            tracing::trace!(generation = tick.generation, "stale tick dropped");
            return false;
        }
        self.tracker.tick()
    }

    // ── Habit intents ────────────────────────────────────────────────

    /// Create (no id) or edit (id present) a habit after validating the form.
    pub fn on_save_habit(&mut self, draft: &HabitDraft) -> Result<Option<Event>> {
        let name = draft.validate()?;
        match draft.id.as_deref() {
            Some(id) => self.repo.edit(id, name, draft.daily_goal),
            None => self.repo.add(name, draft.daily_goal).map(Some),
        }
    }

    /// Delete a habit once the user confirms. An active session on the
    /// habit is stopped (and flushed) first.
    pub fn on_delete_habit(&mut self, habit_id: &str, confirm: &dyn Confirm) -> Result<Option<Event>> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(habit_id, "delete declined");
            return Ok(None);
        }
        if self.tracker.active_habit_id() == Some(habit_id) {
            self.on_stop()?;
        }
        self.repo.delete(&self.tracker, habit_id)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sync_ticker(&mut self) {
        match (self.tracker.is_running(), self.ticker.is_scheduled()) {
            (true, false) => {
                self.ticker.schedule();
            }
            (false, true) => {
                self.ticker.cancel();
            }
            _ => {}
        }
    }
}
