use std::io::{BufRead, Write};

use clap::Subcommand;
use lilypad_core::{Config, HabitDraft};

use super::{describe, habit_line, open_controller, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Add {
        /// Habit name
        name: String,
        /// Daily goal in minutes
        #[arg(long)]
        goal: u32,
    },
    /// Rename a habit or change its daily goal
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New daily goal in minutes
        #[arg(long)]
        goal: Option<u32>,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// List habits
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one habit as JSON
    Show {
        /// Habit ID
        id: String,
    },
}

/// Ask on stderr, read the answer from stdin. Anything but y/yes declines.
fn prompt_yes_no(message: &str) -> bool {
    eprint!("{message} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn run(action: HabitAction) -> CliResult {
    let config = Config::load_or_default();
    let (mut ctl, _ticks) = open_controller(&config)?;
    let show_seconds = config.ui.show_seconds;

    match action {
        HabitAction::Add { name, goal } => {
            if let Some(event) = ctl.on_save_habit(&HabitDraft::new(name, goal))? {
                println!("{}", describe(&event, ctl.habits(), show_seconds));
            }
        }
        HabitAction::Edit { id, name, goal } => {
            let current = ctl
                .repository()
                .get(&id)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            let draft = HabitDraft::editing(
                id.as_str(),
                name.unwrap_or_else(|| current.name.clone()),
                goal.unwrap_or(current.daily_goal),
            );
            if let Some(event) = ctl.on_save_habit(&draft)? {
                println!("{}", describe(&event, ctl.habits(), show_seconds));
            }
        }
        HabitAction::Delete { id, yes } => {
            if ctl.repository().get(&id).is_none() {
                return Err(format!("habit not found: {id}").into());
            }
            let skip_prompt = yes || !config.ui.confirm_delete;
            let confirm = |message: &str| skip_prompt || prompt_yes_no(message);
            match ctl.on_delete_habit(&id, &confirm)? {
                Some(event) => println!("{}", describe(&event, ctl.habits(), show_seconds)),
                None => println!("cancelled"),
            }
        }
        HabitAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(ctl.habits())?);
            } else if ctl.habits().is_empty() {
                println!("no habits yet; add one with `lilypad habit add <name> --goal <minutes>`");
            } else {
                for habit in ctl.habits() {
                    println!("{}", habit_line(habit));
                }
            }
        }
        HabitAction::Show { id } => {
            let habit = ctl
                .repository()
                .get(&id)
                .ok_or_else(|| format!("habit not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(habit)?);
        }
    }
    Ok(())
}
