//! Command-line configuration.

use crate::commands::Command;
use clap::Parser;
use dispatch_core::Error;
use dispatch_sim::SimulationConfig;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;

/// Weighted round robin and consistent hashing over a simulated node pool.
#[derive(Debug, Parser)]
#[command(name = "dispatch", version)]
pub struct CliConfig {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// JSON file with simulation settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Install the global `tracing` subscriber. Logs go to stderr so
    /// command output on stdout stays clean.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    pub fn simulation_config(&self) -> anyhow::Result<SimulationConfig> {
        match &self.config {
            Some(path) => Ok(SimulationConfig::from_file(path)?),
            None => Ok(SimulationConfig::default()),
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let sim_config = self.simulation_config()?;
        let result = self.command.execute(&sim_config)?;
        println!("{}", result);
        Ok(())
    }
}

/// Why a `--node` argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum NodeSpecError {
    #[error(transparent)]
    Weight(#[from] Error),
    #[error("missing node name in {0:?}")]
    MissingName(String),
}

/// Node given on the command line as `NAME=WEIGHT` (weight defaults to 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub name: String,
    pub weight: u32,
}

impl FromStr for NodeSpec {
    type Err = NodeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, weight) = match s.rsplit_once('=') {
            Some((name, weight)) => {
                let weight = weight
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| Error::InvalidWeight(format!("{:?}: {}", weight.trim(), e)))?;
                (name.trim(), weight)
            }
            None => (s.trim(), 1),
        };
        if name.is_empty() {
            return Err(NodeSpecError::MissingName(s.to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            weight,
        })
    }
}
