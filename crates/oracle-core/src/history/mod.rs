//! Exploration history module.
//!
//! - `entry`: A single recorded event with its map snapshot (`HistoryEntry`, `HistoryEvent`)
//! - `log`: The append-only per-timeline log (`ExplorationLog`)

mod entry;
mod log;

pub use entry::{HistoryEntry, HistoryEvent};
pub use log::ExplorationLog;
