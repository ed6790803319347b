//! Load simulation on top of the dispatch core.
//!
//! This crate layers simulation concerns over node selection:
//! - Per-node capacity and load, released after a fixed hold time
//! - Manual and automatic request injection on a logical clock
//! - A bounded operator log and a serializable snapshot

pub mod config;
pub mod controller;
pub mod error;
pub mod log;
pub mod snapshot;

pub use config::SimulationConfig;
pub use controller::{Assignment, Controller, Load, DEFAULT_ROSTER};
pub use error::{Result, SimulationError};
pub use log::{EventLog, LogEntry, LogEvent};
pub use snapshot::{ServerSnapshot, Snapshot};
