//! Serializable view of the simulation for dashboards and other consumers.

use dispatch_core::{Algorithm, NodeId, NodeStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSnapshot {
    pub id: NodeId,
    pub name: String,
    pub weight: u32,
    pub current_load: u32,
    pub capacity: u32,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub servers: Vec<ServerSnapshot>,
    /// Most recent log lines, newest first.
    pub logs: Vec<String>,
    pub is_auto_injecting: bool,
    pub auto_inject_interval: u64,
    pub algorithm: Algorithm,
    pub clock_ms: u64,
    pub users_served: u64,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
