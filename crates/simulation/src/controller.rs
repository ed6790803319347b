//! Simulation controller.
//!
//! Owns the node pool and the active selector, injects synthetic requests
//! (`user-1`, `user-2`, ...), and keeps per-node load on a logical clock:
//! each assignment holds one unit of load until `release_after` has passed.
//! Time only moves through [`Controller::advance`], which also fires
//! automatic injections when they are enabled.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::log::{EventLog, LogEvent};
use crate::snapshot::{ServerSnapshot, Snapshot};
use dispatch_core::{Algorithm, Node, NodeId, NodePool, NodeStatus, NodeSummary, Selector};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Nodes a fresh simulation starts with: name and weight.
pub const DEFAULT_ROSTER: [(&str, u32); 3] = [("Titan", 5), ("Scout A", 1), ("Scout B", 1)];

/// Load carried by one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Load {
    pub current: u32,
    pub capacity: u32,
}

/// One request routed to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub user: u64,
    pub key: String,
    pub node: NodeSummary,
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct PendingRelease {
    due: Duration,
    node: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct AutoInject {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug)]
pub struct Controller {
    config: SimulationConfig,
    pool: NodePool,
    selector: Selector,
    loads: HashMap<NodeId, Load>,
    // due times only grow, so this stays ordered
    releases: VecDeque<PendingRelease>,
    clock: Duration,
    users_served: u64,
    auto_inject: Option<AutoInject>,
    auto_inject_interval: Duration,
    log: EventLog,
}

impl Controller {
    pub fn new(config: SimulationConfig, algorithm: Algorithm) -> Self {
        let pool = NodePool::new();
        Self {
            selector: Selector::build(algorithm, &pool),
            pool,
            loads: HashMap::new(),
            releases: VecDeque::new(),
            clock: Duration::ZERO,
            users_served: 0,
            auto_inject: None,
            auto_inject_interval: config.auto_inject_interval(),
            log: EventLog::new(config.log_capacity),
            config,
        }
    }

    /// Controller pre-populated with [`DEFAULT_ROSTER`].
    pub fn with_default_roster(config: SimulationConfig, algorithm: Algorithm) -> Result<Self> {
        let mut controller = Self::new(config, algorithm);
        for (name, weight) in DEFAULT_ROSTER {
            controller.add_node(name, weight)?;
        }
        Ok(controller)
    }

    /// Add an online node under a freshly generated id.
    pub fn add_node(&mut self, name: &str, weight: u32) -> Result<NodeId> {
        self.add_node_with_id(Uuid::new_v4().to_string(), name, weight)
    }

    /// Add an online node under a caller-chosen id.
    pub fn add_node_with_id(
        &mut self,
        id: impl Into<NodeId>,
        name: &str,
        weight: u32,
    ) -> Result<NodeId> {
        let node = Node::new(id, name).with_weight(weight);
        let id = node.id.clone();
        let event = self.pool.add(node)?;
        self.loads.insert(
            id.clone(),
            Load {
                current: 0,
                capacity: self.config.capacity_for(weight),
            },
        );
        self.selector.apply(&event, &self.pool);

        info!(node = %id, name, weight, "node added");
        self.record(LogEvent::NodeAdded {
            name: name.to_owned(),
            weight,
        });
        Ok(id)
    }

    pub fn remove_node(&mut self, id: &NodeId) -> Result<()> {
        let name = self.name_of(id)?;
        let event = self.pool.remove(id)?;
        self.loads.remove(id);
        self.releases.retain(|r| &r.node != id);
        self.selector.apply(&event, &self.pool);

        info!(node = %id, name = %name, "node removed");
        self.record(LogEvent::NodeRemoved { name });
        Ok(())
    }

    /// Change a node's weight; its capacity follows.
    pub fn set_weight(&mut self, id: &NodeId, weight: u32) -> Result<()> {
        let name = self.name_of(id)?;
        let event = self.pool.set_weight(id, weight)?;
        let capacity = self.config.capacity_for(weight);
        let load = self.loads.entry(id.clone()).or_default();
        load.capacity = capacity;
        load.current = load.current.min(capacity);
        self.selector.apply(&event, &self.pool);

        info!(node = %id, weight, capacity, "weight updated");
        self.record(LogEvent::WeightUpdated { name, weight });
        Ok(())
    }

    pub fn set_status(&mut self, id: &NodeId, status: NodeStatus) -> Result<()> {
        let name = self.name_of(id)?;
        let event = self.pool.set_status(id, status)?;
        self.selector.apply(&event, &self.pool);

        info!(node = %id, %status, "status changed");
        self.record(LogEvent::StatusChanged { name, status });
        Ok(())
    }

    /// Switch strategy. The new selector starts fresh.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        if self.selector.algorithm() == algorithm {
            return;
        }
        self.selector = Selector::build(algorithm, &self.pool);
        info!(%algorithm, "algorithm switched");
        self.record(LogEvent::AlgorithmSwitched(algorithm));
    }

    /// Turn automatic injection on or off, optionally changing its interval.
    ///
    /// The first automatic injection happens one interval from now.
    pub fn set_auto_inject(&mut self, enabled: bool, interval: Option<Duration>) {
        if let Some(interval) = interval {
            self.auto_inject_interval = interval.max(Duration::from_millis(1));
        }
        self.auto_inject = enabled.then(|| AutoInject {
            interval: self.auto_inject_interval,
            next_due: self.clock + self.auto_inject_interval,
        });
        info!(
            enabled,
            interval_ms = self.auto_inject_interval.as_millis() as u64,
            "auto-injection toggled"
        );
    }

    /// Route `count` new users.
    ///
    /// Stops at the first failure: the error is logged, auto-injection is
    /// halted, and the error is returned.
    pub fn inject(&mut self, count: usize) -> Result<Vec<Assignment>> {
        let mut assigned = Vec::new();
        for _ in 0..count {
            match self.assign_next() {
                Ok(assignment) => assigned.push(assignment),
                Err(e) => {
                    self.halt(&e);
                    return Err(e);
                }
            }
        }
        Ok(assigned)
    }

    /// Move the clock forward, releasing load and firing automatic
    /// injections in time order. Releases due at the same instant as an
    /// injection go first.
    ///
    /// Returns the automatic assignments made, or the first injection
    /// failure once the clock has reached its target.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<Assignment>> {
        let target = self.clock + elapsed;
        let mut assigned = Vec::new();
        let mut failure = None;

        loop {
            let next_release = self.releases.front().map(|r| r.due).filter(|d| *d <= target);
            let next_inject = self.auto_inject.map(|a| a.next_due).filter(|d| *d <= target);

            let release_first = match (next_release, next_inject) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(r), Some(i)) => r <= i,
            };

            if release_first {
                self.release_next();
            } else if let Some(auto) = self.auto_inject.as_mut() {
                self.clock = auto.next_due;
                auto.next_due += auto.interval;
                match self.inject(1) {
                    Ok(mut batch) => assigned.append(&mut batch),
                    Err(e) => {
                        failure.get_or_insert(e);
                    }
                }
            }
        }

        self.clock = target;
        match failure {
            Some(e) => Err(e),
            None => Ok(assigned),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let servers = self
            .pool
            .iter()
            .map(|node| {
                let load = self.load(&node.id).unwrap_or_default();
                ServerSnapshot {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    weight: node.weight,
                    current_load: load.current,
                    capacity: load.capacity,
                    status: node.status,
                }
            })
            .collect();

        Snapshot {
            servers,
            logs: self
                .log
                .iter()
                .take(self.config.snapshot_log_lines)
                .map(|e| e.to_string())
                .collect(),
            is_auto_injecting: self.is_auto_injecting(),
            auto_inject_interval: self.auto_inject_interval.as_millis() as u64,
            algorithm: self.algorithm(),
            clock_ms: self.clock.as_millis() as u64,
            users_served: self.users_served,
        }
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn algorithm(&self) -> Algorithm {
        self.selector.algorithm()
    }

    pub fn load(&self, id: &NodeId) -> Option<Load> {
        self.loads.get(id).copied()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn users_served(&self) -> u64 {
        self.users_served
    }

    pub fn is_auto_injecting(&self) -> bool {
        self.auto_inject.is_some()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn assign_next(&mut self) -> Result<Assignment> {
        let user = self.users_served + 1;
        let key = format!("user-{}", user);
        let node = self.selector.select(&key)?;

        if let Some(load) = self.loads.get_mut(&node.id) {
            load.current = (load.current + 1).min(load.capacity);
        }
        self.releases.push_back(PendingRelease {
            due: self.clock + self.config.release_after(),
            node: node.id.clone(),
        });
        self.users_served = user;

        debug!(user, node = %node.id, "request assigned");
        self.record(LogEvent::Assigned {
            user,
            node: node.name.clone(),
        });
        Ok(Assignment {
            user,
            key,
            node,
            at: self.clock,
        })
    }

    fn release_next(&mut self) {
        if let Some(release) = self.releases.pop_front() {
            self.clock = release.due;
            if let Some(load) = self.loads.get_mut(&release.node) {
                load.current = load.current.saturating_sub(1);
                debug!(node = %release.node, load = load.current, "load released");
            }
        }
    }

    fn halt(&mut self, error: &crate::error::SimulationError) {
        warn!(%error, "request routing failed");
        self.record(LogEvent::Error(error.to_string()));
        if self.auto_inject.take().is_some() {
            info!("auto-injection halted");
        }
    }

    fn name_of(&self, id: &NodeId) -> Result<String> {
        self.pool
            .get(id)
            .map(|n| n.name.clone())
            .ok_or_else(|| dispatch_core::Error::UnknownNode(id.clone()).into())
    }

    fn record(&mut self, event: LogEvent) {
        self.log.push(self.clock, event);
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(SimulationConfig::default(), Algorithm::default())
    }
}
