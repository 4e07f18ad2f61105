//! GitHub Actions output lines for computed matrices.

use super::PlatformMatrix;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Compact JSON, one line per platform, for `$GITHUB_OUTPUT`
    MachineReadable,
    /// Indented JSON for the job log
    HumanReadable,
}

#[derive(Debug, Serialize)]
struct DeployOutput<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include: Vec<DeployOutputEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct DeployOutputEntry<'a> {
    duckdb_arch: &'a str,
}

/// `<platform>_matrix=<json>` lines, platforms in sorted order
pub fn render_output_lines(
    matrices: &BTreeMap<String, PlatformMatrix>,
    mode: OutputMode,
) -> serde_json::Result<String> {
    let mut out = String::new();
    for (platform, matrix) in matrices {
        let payload = match mode {
            OutputMode::MachineReadable => serde_json::to_string(matrix)?,
            OutputMode::HumanReadable => serde_json::to_string_pretty(matrix)?,
        };
        out.push_str(platform);
        out.push_str("_matrix=");
        out.push_str(&payload);
        out.push('\n');
    }
    Ok(out)
}

/// A single `deploy_matrix=` line listing every selected architecture
pub fn render_deploy_output_line(
    matrices: &BTreeMap<String, PlatformMatrix>,
) -> serde_json::Result<String> {
    let payload = serde_json::to_string(&deploy_output(matrices))?;
    Ok(format!("deploy_matrix={payload}\n"))
}

/// Every selected architecture, one per line
pub fn render_deploy_readable_lines(matrices: &BTreeMap<String, PlatformMatrix>) -> String {
    deploy_output(matrices)
        .include
        .iter()
        .map(|entry| format!("{}\n", entry.duckdb_arch))
        .collect()
}

fn deploy_output(matrices: &BTreeMap<String, PlatformMatrix>) -> DeployOutput<'_> {
    DeployOutput {
        include: matrices
            .values()
            .flat_map(|m| m.include.iter())
            .map(|e| DeployOutputEntry {
                duckdb_arch: &e.duckdb_arch,
            })
            .collect(),
    }
}
