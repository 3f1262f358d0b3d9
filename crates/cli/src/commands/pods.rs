//! Pod health commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, PodVerdict};
use crate::output::{color_status, format_containers, format_diagnostic, print_items, OutputFormat};

/// Row for the pod health table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Containers")]
    containers: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&PodVerdict> for PodRow {
    fn from(pod: &PodVerdict) -> Self {
        Self {
            namespace: pod.namespace.clone(),
            name: pod.name.clone(),
            status: color_status(&pod.status),
            containers: format_containers(&pod.containers),
            reason: format_diagnostic(pod.reason.as_deref(), pod.message.as_deref()),
        }
    }
}

/// Show pod health verdicts, in the order the agent returned them
pub async fn list_pods(
    client: &ApiClient,
    namespace: Option<String>,
    problems_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let pods: Vec<PodVerdict> = client
        .pods()
        .await?
        .into_iter()
        .filter(|p| namespace.as_deref().map_or(true, |ns| p.namespace == ns))
        .filter(|p| !problems_only || is_problem(&p.status))
        .collect();

    let rows = pods.iter().map(PodRow::from).collect();
    print_items(&pods, rows, format);
    Ok(())
}

fn is_problem(status: &str) -> bool {
    !matches!(status, "Ready" | "Running" | "Succeeded")
}
