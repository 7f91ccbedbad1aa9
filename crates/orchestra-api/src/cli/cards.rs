//! `orchestra cards`: run discovery only and list what each agent offers.

use anyhow::{Context, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::state::{AppState, Overrides};

pub async fn list_cards(state: &AppState, json: bool) -> Result<()> {
    let mesh = state.mesh(Overrides::default());
    mesh.discover().await.context("agent discovery did not complete")?;
    let cards = mesh.orchestrator().cards();

    if json {
        let cards: Vec<_> = cards.values().collect();
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Agent").fg(Color::White),
        Cell::new("Capabilities").fg(Color::White),
        Cell::new("Intents").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for card in cards.values() {
        let capabilities: Vec<&str> = card.capabilities.iter().map(String::as_str).collect();
        let intents: Vec<&str> = card.supported_intents.iter().map(|i| i.as_str()).collect();
        table.add_row(vec![
            Cell::new(&card.name).fg(Color::Cyan),
            Cell::new(capabilities.join(", ")).fg(Color::Green),
            Cell::new(intents.join(" ")).fg(Color::DarkGrey),
            Cell::new(&card.description),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} agent{} discovered",
        style(cards.len()).bold(),
        if cards.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
