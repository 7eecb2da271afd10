pub mod config;
pub mod focus;
pub mod habit;

use lilypad_core::display::whole_minutes;
use lilypad_core::{
    format_duration, Config, Database, Event, FocusController, Habit, HabitRepository, Ticker,
};
use tokio::sync::mpsc::UnboundedReceiver;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the configured database and wrap it in a controller.
pub fn open_controller(
    config: &Config,
) -> CliResult<(FocusController<Database>, UnboundedReceiver<lilypad_core::Tick>)> {
    let db = Database::open(&config.storage.database_file)?;
    let repo = HabitRepository::load(db, config.storage.habits_key.clone());
    let (ticker, ticks) = Ticker::new(config.tick_interval());
    Ok((FocusController::new(repo, ticker), ticks))
}

fn name_of<'a>(habits: &'a [Habit], id: &str) -> &'a str {
    habits
        .iter()
        .find(|h| h.id == id)
        .map(|h| h.name.as_str())
        .unwrap_or("(deleted habit)")
}

/// One-line summary of a habit for listings.
pub fn habit_line(habit: &Habit) -> String {
    format!(
        "{}  {}  {} / {} min",
        habit.id,
        habit.name,
        whole_minutes(habit.time_spent),
        habit.daily_goal
    )
}

/// Human-readable rendering of an event. `habits` resolves ids to names.
pub fn describe(event: &Event, habits: &[Habit], show_seconds: bool) -> String {
    match event {
        Event::HabitAdded { habit, .. } => format!("added {}", habit_line(habit)),
        Event::HabitUpdated { habit, .. } => format!("updated {}", habit_line(habit)),
        Event::HabitDeleted { habit, .. } => format!(
            "deleted {} ({} tracked)",
            habit.name,
            format_duration(habit.time_spent)
        ),
        Event::SessionStarted {
            habit_id, previous, ..
        } => {
            let mut line = format!("tracking {}", name_of(habits, habit_id));
            if let Some(flush) = previous.as_ref().filter(|f| f.flushed_secs > 0) {
                line.push_str(&format!(
                    " (saved {} to {})",
                    format_duration(flush.flushed_secs),
                    name_of(habits, &flush.habit_id)
                ));
            }
            line
        }
        Event::SessionPaused {
            habit_id,
            elapsed_secs,
            ..
        } => format!(
            "paused {} at {}",
            name_of(habits, habit_id),
            format_duration(*elapsed_secs)
        ),
        Event::SessionResumed { habit_id, .. } => {
            format!("resumed {}", name_of(habits, habit_id))
        }
        Event::SessionStopped { flush, .. } => format!(
            "stopped {}, saved {}",
            name_of(habits, &flush.habit_id),
            format_duration(flush.flushed_secs)
        ),
        Event::StateSnapshot {
            active_habit_name,
            is_running,
            elapsed_secs,
            total_secs,
            daily_goal_min,
            goal_progress_pct,
            ..
        } => match active_habit_name {
            None => "no active habit".to_string(),
            Some(name) => {
                let state = if *is_running { "running" } else { "paused" };
                let session = if show_seconds {
                    format_duration(*elapsed_secs)
                } else {
                    format!("{} min", whole_minutes(*elapsed_secs))
                };
                format!(
                    "{name} [{state}] session {session}, total {} of {daily_goal_min} min ({goal_progress_pct:.0}%)",
                    whole_minutes(*total_secs)
                )
            }
        },
    }
}
