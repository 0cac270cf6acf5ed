use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path) -> Result<(), String> {
    let scenario = super::load_scenario(path)?;

    if scenario.actors.is_empty() {
        println!("  No actors found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Heat", "Evasion", "E-Def", "Items"]);

    for actor in scenario.actors.actors() {
        let heat = match &actor.heat {
            Some(track) => format!("{}/{}", track.current, track.max),
            None => "-".to_string(),
        };
        let items = if actor.items.is_empty() {
            "-".to_string()
        } else {
            actor
                .items
                .iter()
                .map(|i| i.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            actor.name.clone(),
            actor.kind.to_string(),
            heat,
            actor.stats.evasion.to_string(),
            actor.stats.e_defense.to_string(),
            items,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} actors", scenario.actors.len());

    Ok(())
}
