//! Output formatting for run reports and health checks
//!
//! Reports go to stdout as pretty JSON, YAML or human-readable text.

use crate::api::ServerVersion;
use crate::stacker::RunReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Result of the `health` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub endpoint: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<ServerVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize run report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize run report to YAML")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_health(&self, health: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(health)
                .context("Failed to serialize health status to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(health)
                .context("Failed to serialize health status to YAML"),
            OutputFormat::Human => Ok(self.format_health_human(health)),
        }
    }

    fn format_report_human(&self, report: &RunReport) -> String {
        let mut out = String::new();
        let stats = &report.stats;

        let _ = writeln!(out, "Stacking report (server {})", report.server_version);
        if report.read_only {
            let _ = writeln!(out, "  Mode:            {} (read-only)", report.mode);
        } else {
            let _ = writeln!(out, "  Mode:            {}", report.mode);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Assets");
        let _ = writeln!(out, "  Total:           {}", report.total_assets);
        let _ = writeln!(out, "  Already stacked: {}", report.already_stacked);
        let _ = writeln!(out, "  Matched:         {}", report.matched);
        let _ = writeln!(out, "  Ignored:         {}", report.ignored);
        let _ = writeln!(out);
        let _ = writeln!(out, "Candidates:        {}", report.candidates);
        let _ = writeln!(out, "  Stackable:       {}", stats.stackable);
        let _ = writeln!(out, "  Not stackable:   {}", stats.not_stackable);
        let _ = writeln!(out, "  Succeeded:       {}", stats.succeeded);
        let _ = writeln!(out, "  Failed:          {}", stats.failed);
        if report.read_only {
            let _ = writeln!(out, "  Not applied:     {}", stats.unapplied());
        }

        if report.parent_conflicts > 0 {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Warning: {} group(s) matched more than one parent; only the last one was kept",
                report.parent_conflicts
            );
        }

        out
    }

    fn format_health_human(&self, health: &HealthStatus) -> String {
        match (&health.version, &health.error) {
            (Some(version), _) => format!("✓ {} is reachable ({})\n", health.endpoint, version),
            (None, Some(error)) => format!("✗ {} is unreachable: {}\n", health.endpoint, error),
            (None, None) => format!("✗ {} is unreachable\n", health.endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stacker::RunStats;

    fn report() -> RunReport {
        RunReport {
            server_version: ServerVersion {
                major: 1,
                minor: 118,
                patch: 2,
            },
            total_assets: 10,
            already_stacked: 2,
            matched: 6,
            ignored: 2,
            candidates: 3,
            parent_conflicts: 0,
            read_only: false,
            mode: "create".to_string(),
            stats: RunStats {
                stackable: 2,
                not_stackable: 1,
                succeeded: 1,
                failed: 1,
            },
        }
    }

    #[test]
    fn test_json_report() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["stats"]["stackable"], 2);
        assert_eq!(value["stats"]["failed"], 1);
        assert_eq!(value["server_version"]["minor"], 118);
    }

    #[test]
    fn test_yaml_report() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&report())
            .unwrap();
        assert!(output.contains("total_assets: 10"));
    }

    #[test]
    fn test_human_report() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report())
            .unwrap();

        assert!(output.contains("server v1.118.2"));
        assert!(output.contains("Succeeded:       1"));
        assert!(!output.contains("read-only"));
        assert!(!output.contains("Not applied"));
        assert!(!output.contains("Warning"));
    }

    #[test]
    fn test_human_report_read_only_with_conflicts() {
        let mut report = report();
        report.read_only = true;
        report.parent_conflicts = 2;

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report)
            .unwrap();
        assert!(output.contains("(read-only)"));
        assert!(output.contains("Not applied:     0"));
        assert!(output.contains("2 group(s) matched more than one parent"));
    }

    #[test]
    fn test_health_formats() {
        let healthy = HealthStatus {
            endpoint: "http://immich/api".to_string(),
            reachable: true,
            version: Some(ServerVersion {
                major: 1,
                minor: 2,
                patch: 3,
            }),
            error: None,
        };
        let human = OutputFormatter::new(OutputFormat::Human)
            .format_health(&healthy)
            .unwrap();
        assert!(human.contains("reachable (v1.2.3)"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_health(&healthy)
            .unwrap();
        assert!(!json.contains("\"error\""));
    }
}
