//! Deployment replica commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, ReplicaVerdict};
use crate::output::{format_replicas, print_items, OutputFormat};

/// Row for the deployment table
#[derive(Tabled)]
struct DeploymentRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ready")]
    ready: String,
}

/// Show deployment replica counts
pub async fn list_deployments(
    client: &ApiClient,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let deployments: Vec<ReplicaVerdict> = client
        .deployments()
        .await?
        .into_iter()
        .filter(|d| namespace.as_deref().map_or(true, |ns| d.namespace == ns))
        .collect();

    let rows = deployments
        .iter()
        .map(|d| DeploymentRow {
            namespace: d.namespace.clone(),
            name: d.name.clone(),
            ready: format_replicas(d.ready_replicas, d.desired_replicas),
        })
        .collect();

    print_items(&deployments, rows, format);
    Ok(())
}
