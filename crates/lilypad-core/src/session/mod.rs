mod ticker;
mod tracker;

pub use ticker::{Tick, Ticker};
pub use tracker::{SessionState, SessionTracker};
