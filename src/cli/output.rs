//! CLI output: snapshot rendering and error mapping to the CLI surface.

use crate::cli::parse::OutputFormat;
use crate::dependency::Snapshot;
use crate::error::{ClientError, CommandError, DependencyError};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

/// Render a snapshot as a table or pretty JSON.
pub fn render_snapshot(snapshot: &Snapshot, format: OutputFormat) -> Result<String, CommandError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(snapshot)
            .map_err(|e| CommandError::Output(e.to_string())),
        OutputFormat::Table => Ok(render_table(snapshot)),
    }
}

fn render_table(snapshot: &Snapshot) -> String {
    let footer = format!(
        "index {}, last contact {}ms",
        snapshot.meta.last_index,
        snapshot.meta.last_contact.as_millis()
    );
    if snapshot.is_empty() {
        return format!("No nodes.\n{}", footer);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "ID", "Address", "Datacenter", "Region"]);
    for node in &snapshot.nodes {
        table.add_row(vec![
            node.name.as_str(),
            node.id.as_str(),
            node.address.as_str(),
            node.datacenter.as_str(),
            node.region.as_deref().unwrap_or("-"),
        ]);
    }
    format!("{}\n{}", table, footer)
}

/// Map command errors to a string for CLI output, with a hint where one helps.
pub fn map_error(e: &CommandError) -> String {
    let client_error = match e {
        CommandError::Dependency(DependencyError::Backend { source, .. }) => Some(source),
        CommandError::Client(source) => Some(source),
        _ => None,
    };
    match client_error {
        Some(ClientError::Unauthorized(_)) => {
            format!("{}\nhint: set NOMAD_TOKEN or nomad.token in the config file", e)
        }
        Some(ClientError::Connection(_)) => {
            format!("{}\nhint: check NOMAD_ADDR or pass --address", e)
        }
        _ => e.to_string(),
    }
}
