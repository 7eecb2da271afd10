//! Interactive focus shell.
//!
//! Reads commands from stdin while the session ticker runs; both are
//! multiplexed on a single-threaded runtime so every state change happens on
//! one thread. Leaving the shell stops the active session, flushing its
//! seconds.

use lilypad_core::{Config, Database, FocusController, HabitDraft, DELETE_PROMPT};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::habit::is_yes;
use super::{describe, habit_line, open_controller, CliResult};

const HELP: &str = "\
commands:
  track <id>               start a session (saves any running one)
  pause | resume | stop    control the current session
  status                   show the current session
  list                     list habits
  add <goal> <name...>     create a habit with a daily goal in minutes
  edit <id> <goal> <name...>
  delete <id>              delete a habit (stops it first if active)
  help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Track(String),
    Pause,
    Resume,
    Stop,
    Status,
    List,
    Add { goal: u32, name: String },
    Edit { id: String, goal: u32, name: String },
    Delete(String),
    Help,
    Quit,
    Empty,
}

pub fn parse(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let mut arg = |what: &str| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| format!("{head}: missing {what}"))
    };

    let command = match head {
        "track" | "t" => ShellCommand::Track(arg("habit id")?),
        "pause" | "p" => ShellCommand::Pause,
        "resume" | "r" => ShellCommand::Resume,
        "stop" | "s" => ShellCommand::Stop,
        "status" => ShellCommand::Status,
        "list" | "ls" => ShellCommand::List,
        "add" => {
            let goal = parse_goal(&arg("goal")?)?;
            ShellCommand::Add {
                goal,
                name: rest(line, 2),
            }
        }
        "edit" => {
            let id = arg("habit id")?;
            let goal = parse_goal(&arg("goal")?)?;
            ShellCommand::Edit {
                id,
                goal,
                name: rest(line, 3),
            }
        }
        "delete" | "rm" => ShellCommand::Delete(arg("habit id")?),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(command)
}

fn parse_goal(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("goal must be a whole number of minutes, got '{raw}'"))
}

/// Everything after the first `skip` words, with inner spacing collapsed.
fn rest(line: &str, skip: usize) -> String {
    line.split_whitespace()
        .skip(skip)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run(initial_habit: Option<String>) -> CliResult {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(shell(config, initial_habit))
}

async fn shell(config: Config, initial_habit: Option<String>) -> CliResult {
    let (mut ctl, mut ticks) = open_controller(&config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(id) = initial_habit {
        match ctl.on_track(&id) {
            Ok(event) => println!("{}", describe(&event, ctl.habits(), config.ui.show_seconds)),
            Err(e) => eprintln!("error: {e}"),
        }
    }
    eprintln!("type `help` for commands");

    let outcome = event_loop(&config, &mut ctl, &mut ticks, &mut lines).await;

    // Leaving always closes the session, even when stdin failed.
    if let Some(event) = ctl.on_stop()? {
        println!("{}", describe(&event, ctl.habits(), config.ui.show_seconds));
    }
    outcome
}

async fn event_loop(
    config: &Config,
    ctl: &mut FocusController<Database>,
    ticks: &mut tokio::sync::mpsc::UnboundedReceiver<lilypad_core::Tick>,
    lines: &mut Lines<BufReader<Stdin>>,
) -> CliResult {
    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                ctl.on_tick(tick);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    return Ok(());
                };
                match parse(&line) {
                    Ok(ShellCommand::Quit) => return Ok(()),
                    Ok(command) => {
                        if let Err(e) = execute(config, ctl, lines, command).await {
                            eprintln!("error: {e}");
                        }
                    }
                    Err(message) => eprintln!("{message}"),
                }
            }
        }
    }
}

async fn execute(
    config: &Config,
    ctl: &mut FocusController<Database>,
    lines: &mut Lines<BufReader<Stdin>>,
    command: ShellCommand,
) -> CliResult {
    let show_seconds = config.ui.show_seconds;
    let event = match command {
        ShellCommand::Track(id) => Some(ctl.on_track(&id)?),
        ShellCommand::Pause => ctl.on_pause(),
        ShellCommand::Resume => ctl.on_resume(),
        ShellCommand::Stop => ctl.on_stop()?,
        ShellCommand::Status => Some(ctl.status()),
        ShellCommand::Add { goal, name } => ctl.on_save_habit(&HabitDraft::new(name, goal))?,
        ShellCommand::Edit { id, goal, name } => {
            let event = ctl.on_save_habit(&HabitDraft::editing(id.as_str(), name, goal))?;
            if event.is_none() {
                return Err(format!("habit not found: {id}").into());
            }
            event
        }
        ShellCommand::Delete(id) => {
            let confirmed = if config.ui.confirm_delete {
                eprintln!("{DELETE_PROMPT} [y/N]");
                // Ticks queue up meanwhile and are counted afterwards.
                matches!(lines.next_line().await?, Some(answer) if is_yes(&answer))
            } else {
                true
            };
            let event = ctl.on_delete_habit(&id, &|_: &str| confirmed)?;
            if event.is_none() && confirmed {
                return Err(format!("habit not found: {id}").into());
            }
            event
        }
        ShellCommand::List => {
            if ctl.habits().is_empty() {
                println!("no habits yet");
            }
            for habit in ctl.habits() {
                let marker = if ctl.tracker().active_habit_id() == Some(habit.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}", habit_line(habit));
            }
            None
        }
        ShellCommand::Help => {
            println!("{HELP}");
            None
        }
        ShellCommand::Quit | ShellCommand::Empty => None,
    };

    if let Some(event) = event {
        println!("{}", describe(&event, ctl.habits(), show_seconds));
    }
    Ok(())
}
