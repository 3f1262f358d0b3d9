//! Kube Health CLI
//!
//! A command-line tool for viewing pod health, deployment replica counts
//! and the status of the health agent.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{deployments, pods, status};

/// Kube Health CLI
#[derive(Parser)]
#[command(name = "khc")]
#[command(author, version, about = "CLI for the Kube Health agent", long_about = None)]
pub struct Cli {
    /// Agent URL (can also be set via KHC_AGENT_URL env var)
    #[arg(long, env = "KHC_AGENT_URL", default_value = "http://localhost:8080")]
    pub agent_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show pod health
    Pods {
        /// Only show pods in this namespace
        #[arg(long, short)]
        namespace: Option<String>,

        /// Only show pods that are not Ready, Running or Succeeded
        #[arg(long)]
        problems: bool,
    },

    /// Show deployment replica counts
    Deployments {
        /// Only show deployments in this namespace
        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Show the agent's own health and readiness
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = client::ApiClient::new(&cli.agent_url)?;

    match cli.command {
        Commands::Pods {
            namespace,
            problems,
        } => {
            pods::list_pods(&client, namespace, problems, cli.format).await?;
        }
        Commands::Deployments { namespace } => {
            deployments::list_deployments(&client, namespace, cli.format).await?;
        }
        Commands::Status => {
            status::show_status(&client, cli.format).await?;
        }
    }

    Ok(())
}
