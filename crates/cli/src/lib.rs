//! Command-line front end for the dispatch simulator.
//!
//! Provides commands for:
//! - Routing a batch of requests with either selection algorithm
//! - Inspecting ring positions and key placement
//! - Running a timed auto-injection simulation

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::{CliConfig, NodeSpec, NodeSpecError};
