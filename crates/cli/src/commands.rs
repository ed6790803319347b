//! Subcommands and their output.

use crate::config::NodeSpec;
use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use dispatch_core::partitioner::{StringHashPartitioner, Xxh3Partitioner};
use dispatch_core::ring::{RingBuilder, RingEntry, DEFAULT_RING_SIZE};
use dispatch_core::{Algorithm, Node, NodeId, NodeStatus, NodeSummary};
use dispatch_sim::{Assignment, Controller, SimulationConfig, Snapshot};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a batch of requests and print where each one went.
    Run(RunArgs),
    /// Show ring positions and the node each key maps to.
    Ring(RingArgs),
    /// Inject requests on a timer and print the final state.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Selection algorithm: wrr or ch.
    #[arg(long, default_value = "wrr")]
    pub algorithm: Algorithm,

    /// Node as NAME=WEIGHT; repeat for more nodes. The name doubles as its id.
    #[arg(long = "node", required = true)]
    pub nodes: Vec<NodeSpec>,

    /// Number of requests to route.
    #[arg(long, default_value_t = 1)]
    pub requests: usize,

    /// Names of nodes to mark offline before routing.
    #[arg(long)]
    pub offline: Vec<String>,

    /// Print the final snapshot as JSON instead of the assignments.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashKind {
    String,
    Xxh3,
}

#[derive(Debug, Args)]
pub struct RingArgs {
    #[arg(long = "node", required = true)]
    pub nodes: Vec<NodeSpec>,

    /// Request keys to route.
    #[arg(long = "key")]
    pub keys: Vec<String>,

    #[arg(long, value_enum, default_value = "string")]
    pub hash: HashKind,

    #[arg(long, default_value_t = DEFAULT_RING_SIZE)]
    pub ring_size: u32,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[arg(long, default_value = "wrr")]
    pub algorithm: Algorithm,

    /// Nodes as NAME=WEIGHT. Defaults to Titan=5, Scout A=1, Scout B=1.
    #[arg(long = "node")]
    pub nodes: Vec<NodeSpec>,

    /// Milliseconds between injections; overrides the config file.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// How long to run, in milliseconds. A duration that is not a multiple
    /// of the tick ends with one shorter tick.
    #[arg(long, default_value_t = 10_000)]
    pub duration_ms: u64,

    /// Clock resolution in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub tick_ms: u64,
}

/// What a command produced.
#[derive(Debug)]
pub enum CommandResult {
    Assignments(Vec<Assignment>),
    Ring {
        entries: Vec<RingEntry>,
        routes: Vec<(String, u32, NodeSummary)>,
    },
    Snapshot(Box<Snapshot>),
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Assignments(assignments) => {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for a in assignments {
                    writeln!(f, "User #{} ({}) -> {}", a.user, a.key, a.node.name)?;
                    *counts.entry(a.node.name.as_str()).or_default() += 1;
                }
                write!(f, "--")?;
                for (name, count) in counts {
                    write!(f, "\n{}: {}", name, count)?;
                }
                Ok(())
            }
            CommandResult::Ring { entries, routes } => {
                writeln!(f, "ring:")?;
                for entry in entries {
                    writeln!(f, "  {}", entry)?;
                }
                write!(f, "keys:")?;
                for (key, position, node) in routes {
                    write!(f, "\n  {:>3}° {} -> {}", position, key, node.name)?;
                }
                Ok(())
            }
            CommandResult::Snapshot(snapshot) => {
                let json = snapshot.to_json_pretty().map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl Command {
    pub fn execute(self, config: &SimulationConfig) -> anyhow::Result<CommandResult> {
        match self {
            Command::Run(args) => run(args, config),
            Command::Ring(args) => ring(args),
            Command::Simulate(args) => simulate(args, config),
        }
    }
}

fn controller_for(
    algorithm: Algorithm,
    nodes: &[NodeSpec],
    config: &SimulationConfig,
) -> anyhow::Result<Controller> {
    if nodes.is_empty() {
        return Ok(Controller::with_default_roster(config.clone(), algorithm)?);
    }
    let mut controller = Controller::new(config.clone(), algorithm);
    for spec in nodes {
        controller
            .add_node_with_id(spec.name.as_str(), &spec.name, spec.weight)
            .with_context(|| format!("adding node {:?}", spec.name))?;
    }
    Ok(controller)
}

fn run(args: RunArgs, config: &SimulationConfig) -> anyhow::Result<CommandResult> {
    let mut controller = controller_for(args.algorithm, &args.nodes, config)?;
    for name in &args.offline {
        controller.set_status(&NodeId::from(name.as_str()), NodeStatus::Offline)?;
    }

    let assignments = controller.inject(args.requests)?;
    info!(
        requests = assignments.len(),
        algorithm = %controller.algorithm(),
        "requests routed"
    );

    if args.json {
        Ok(CommandResult::Snapshot(Box::new(controller.snapshot())))
    } else {
        Ok(CommandResult::Assignments(assignments))
    }
}

fn ring(args: RingArgs) -> anyhow::Result<CommandResult> {
    let builder = RingBuilder::new().ring_size(args.ring_size);
    let builder = match args.hash {
        HashKind::String => builder.partitioner(StringHashPartitioner),
        HashKind::Xxh3 => builder.partitioner(Xxh3Partitioner),
    };
    let nodes: Vec<Node> = args
        .nodes
        .iter()
        .map(|spec| Node::new(spec.name.as_str(), spec.name.as_str()).with_weight(spec.weight))
        .collect();
    let ring = builder.add_nodes(&nodes).build();

    let routes = args
        .keys
        .iter()
        .map(|key| Ok((key.clone(), ring.position_of(key), ring.try_select(key)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CommandResult::Ring {
        entries: ring.entries().to_vec(),
        routes,
    })
}

fn simulate(args: SimulateArgs, config: &SimulationConfig) -> anyhow::Result<CommandResult> {
    let mut controller = controller_for(args.algorithm, &args.nodes, config)?;
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.auto_inject_interval());
    let tick_ms = args.tick_ms.max(1);
    let tick = Duration::from_millis(tick_ms);
    let ticks = args.duration_ms / tick_ms;
    let remainder = Duration::from_millis(args.duration_ms % tick_ms);

    controller.set_auto_inject(true, Some(interval));
    info!(
        interval_ms = interval.as_millis() as u64,
        duration_ms = args.duration_ms,
        "simulation started"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building runtime")?;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(tick);
        // the first tick completes immediately
        ticker.tick().await;
        for _ in 0..ticks {
            ticker.tick().await;
            if !advance_logged(&mut controller, tick) {
                return;
            }
        }
        // a partial last tick covers the rest of the duration
        if !remainder.is_zero() {
            tokio::time::sleep(remainder).await;
            advance_logged(&mut controller, remainder);
        }
    });

    Ok(CommandResult::Snapshot(Box::new(controller.snapshot())))
}

/// Advance the simulation by one step; false once routing has failed.
fn advance_logged(controller: &mut Controller, step: Duration) -> bool {
    match controller.advance(step) {
        Ok(assigned) => {
            for a in assigned {
                info!(user = a.user, node = %a.node.name, "user assigned");
            }
            true
        }
        Err(e) => {
            warn!(error = %e, "simulation halted");
            false
        }
    }
}
