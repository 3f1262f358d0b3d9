//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::client::ContainerReadiness;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print rows as a table, or the raw items as JSON
pub fn print_items<T: Serialize, R: Tabled>(items: &[T], rows: Vec<R>, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No resources found".yellow());
                return;
            }
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Color a pod status by severity
pub fn color_status(status: &str) -> String {
    match status {
        "Ready" | "Running" | "Succeeded" => status.green().to_string(),
        "Pending" | "Unknown" => status.yellow().to_string(),
        "NotReady" | "Failed" => status.red().to_string(),
        "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Render container readiness as `app ✓, sidecar ✗`
pub fn format_containers(containers: &[ContainerReadiness]) -> String {
    containers
        .iter()
        .map(|c| format!("{} {}", c.name, if c.ready { "✓" } else { "✗" }))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render replica counts as `ready/desired`
pub fn format_replicas(ready: u32, desired: u32) -> String {
    let text = format!("{}/{}", ready, desired);
    if ready >= desired {
        text.green().to_string()
    } else if ready == 0 {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}

/// Join reason and message for display, skipping empty parts
pub fn format_diagnostic(reason: Option<&str>, message: Option<&str>) -> String {
    match (reason.filter(|r| !r.is_empty()), message.filter(|m| !m.is_empty())) {
        (Some(r), Some(m)) => format!("{}: {}", r, m),
        (Some(r), None) => r.to_string(),
        (None, Some(m)) => m.to_string(),
        (None, None) => String::new(),
    }
}
