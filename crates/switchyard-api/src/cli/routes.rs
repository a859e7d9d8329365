//! `syard routes`: print the route table.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use switchyard_core::route::{RouteInfo, RouteTier};

/// Print routes in precedence order, as a table or JSON.
pub fn print_routes(routes: &[RouteInfo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(routes)?);
        return Ok(());
    }

    if routes.is_empty() {
        println!();
        println!("  {} No routes registered.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Method").fg(Color::White),
        Cell::new("Tier").fg(Color::White),
        Cell::new("Pattern").fg(Color::White),
        Cell::new("Target").fg(Color::White),
    ]);

    for route in routes {
        let tier_cell = match route.tier {
            RouteTier::Static => Cell::new("static").fg(Color::Green),
            RouteTier::Params => Cell::new("params").fg(Color::Cyan),
            RouteTier::Regex => Cell::new("regex").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(route.method.as_str()),
            tier_cell,
            Cell::new(&route.pattern),
            Cell::new(&route.target),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
