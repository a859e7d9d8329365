//! `syard deployments`: report component start outcomes.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use switchyard_core::lifecycle::DeploymentSummary;
use switchyard_types::lifecycle::ComponentState;

pub fn print_deployments(deployments: &[DeploymentSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(deployments)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Component").fg(Color::White),
        Cell::new("Deployment").fg(Color::White),
        Cell::new("State").fg(Color::White),
        Cell::new("Addresses").fg(Color::White),
    ]);

    for deployment in deployments {
        let state_cell = match &deployment.state {
            ComponentState::Started => Cell::new("● started").fg(Color::Green),
            ComponentState::StartFailed(reason) => {
                Cell::new(format!("✗ failed: {reason}")).fg(Color::Red)
            }
            other => Cell::new(other.to_string()).fg(Color::DarkGrey),
        };
        let addresses = deployment
            .addresses
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            Cell::new(&deployment.name),
            Cell::new(deployment.id.to_string()).fg(Color::DarkGrey),
            state_cell,
            Cell::new(if addresses.is_empty() { "-".to_string() } else { addresses }),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
