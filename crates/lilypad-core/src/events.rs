use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Habit;

/// Seconds committed from a session into a habit's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFlush {
    pub habit_id: String,
    pub flushed_secs: u64,
    /// The habit's total after the flush; `None` when nothing was credited.
    pub time_spent: Option<u64>,
}

/// Every state change in the system produces an Event.
/// The CLI prints them; tests match on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitAdded {
        habit: Habit,
        at: DateTime<Utc>,
    },
    HabitUpdated {
        habit: Habit,
        at: DateTime<Utc>,
    },
    HabitDeleted {
        habit: Habit,
        at: DateTime<Utc>,
    },
    /// A new session began. `previous` is the session it replaced, if any.
    SessionStarted {
        habit_id: String,
        previous: Option<SessionFlush>,
        at: DateTime<Utc>,
    },
    SessionPaused {
        habit_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        habit_id: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionStopped {
        flush: SessionFlush,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        active_habit_id: Option<String>,
        active_habit_name: Option<String>,
        is_running: bool,
        elapsed_secs: u64,
        /// Habit total including the unflushed session.
        total_secs: u64,
        daily_goal_min: u32,
        goal_progress_pct: f64,
        at: DateTime<Utc>,
    },
}
