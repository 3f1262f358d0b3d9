//! Agent status command

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, HealthResponse, ReadinessResponse};
use crate::output::{color_status, print_error, print_success, print_warning, OutputFormat};

/// Show the agent's own health and readiness
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health): (bool, HealthResponse) = client.get_probe("healthz").await?;
    let (_, readiness): (bool, ReadinessResponse) = client.get_probe("readyz").await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "health": health,
                "readiness": readiness,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("{}", "Agent Status".bold());
            println!("{}", "=".repeat(50));

            match health.status.as_str() {
                "healthy" => print_success("Agent is healthy"),
                "degraded" => print_warning("Agent is degraded"),
                _ => print_error("Agent is unhealthy"),
            }

            if readiness.ready {
                print_success("Agent is ready");
            } else {
                print_warning(&format!(
                    "Agent is not ready: {}",
                    readiness.reason.as_deref().unwrap_or("unknown reason")
                ));
            }

            println!();
            println!("{}", "Components".bold());
            println!("{}", "-".repeat(50));

            let mut components: Vec<_> = health.components.iter().collect();
            components.sort_by(|a, b| a.0.cmp(b.0));
            for (name, component) in components {
                print!("{:<24}{}", name, color_status(&component.status));
                if component.consecutive_failures > 0 {
                    print!(" ({} consecutive failures)", component.consecutive_failures);
                }
                if let Some(message) = &component.message {
                    print!(" - {}", message.dimmed());
                }
                println!();
            }
        }
    }

    Ok(())
}
