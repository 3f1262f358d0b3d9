//! Agent configuration

use anyhow::{Context, Result};
use health_lib::{OverlapPolicy, SchedulerConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment variables read by the agent
const ENV_PREFIX: &str = "HEALTH_AGENT";

/// Environment variable naming an optional configuration file
const CONFIG_FILE_ENV: &str = "HEALTH_AGENT_CONFIG";

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Name of this agent instance in logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP port for verdict, health and metrics endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// Background scan interval in seconds
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Drop scheduled ticks while the previous pass is still running
    #[serde(default)]
    pub skip_overlapping_scans: bool,

    /// Explicit kubeconfig path; the default discovery applies when unset
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Restrict scans to one namespace; all namespaces when unset
    #[serde(default)]
    pub namespace: Option<String>,

    /// Consecutive failed passes before the agent reports itself unhealthy
    #[serde(default = "default_unhealthy_after")]
    pub unhealthy_after: u32,
}

fn default_instance_name() -> String {
    std::env::var("POD_NAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "health-agent".to_string())
}

fn default_port() -> u16 {
    8080
}

fn default_scan_interval() -> u64 {
    10
}

fn default_unhealthy_after() -> u32 {
    health_lib::health::DEFAULT_UNHEALTHY_AFTER
}

impl AgentConfig {
    /// Load configuration from the environment, layered over the file named
    /// by `HEALTH_AGENT_CONFIG` if set
    pub fn load() -> Result<Self> {
        let file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX), file.as_deref())
    }

    fn load_from(environment: config::Environment, file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let config: AgentConfig = builder
            .add_source(environment)
            .build()
            .context("Failed to read agent configuration")?
            .try_deserialize()
            .context("Invalid agent configuration")?;

        if config.scan_interval_secs == 0 {
            anyhow::bail!("scan_interval_secs must be greater than zero");
        }

        Ok(config)
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.scan_interval_secs),
            overlap: if self.skip_overlapping_scans {
                OverlapPolicy::Skip
            } else {
                OverlapPolicy::Allow
            },
        }
    }
}
