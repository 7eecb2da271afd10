//! # LilyPad Focus Core Library
//!
//! Business logic for tracking focus time against habits. The CLI in
//! `lilypad-cli` is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Habit Repository**: the in-memory habit list, rewritten in full to a
//!   key-value store after every mutation
//! - **Session Tracker**: active habit, running flag and elapsed seconds,
//!   with flush-on-switch and flush-on-stop
//! - **Ticker**: a cancellable one-second tick source driven by tokio
//! - **Storage**: SQLite-backed key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusController`]: owns tracker, repository and ticker; accepts intents
//! - [`SessionTracker`]: session state machine
//! - [`HabitRepository`]: habit CRUD over a [`KvStore`]
//! - [`Config`]: application configuration management

pub mod controller;
pub mod display;
pub mod error;
pub mod events;
pub mod habit;
pub mod session;
pub mod storage;

pub use controller::{Confirm, FocusController, DELETE_PROMPT};
pub use display::format_duration;
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{Event, SessionFlush};
pub use habit::{Habit, HabitDraft, HabitRepository};
pub use session::{SessionState, SessionTracker, Tick, Ticker};
pub use storage::{Config, Database, KvStore, MemoryStore};
