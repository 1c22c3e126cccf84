//! `semdex stats`: record counts and the active embedding strategy.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.index.stats().await?;
    let generator = state.index.generator();

    if json {
        let result = serde_json::json!({
            "total_embeddings": stats.total_embeddings,
            "by_type": stats.by_type,
            "embedder": generator.model_name(),
            "dimension": generator.dimension(),
            "data_dir": state.data_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} embeddings",
        style("semdex").bold(),
        style(stats.total_embeddings).cyan().bold()
    );
    println!(
        "  {} {} ({} dims)",
        style("Embedder").dim(),
        generator.model_name(),
        generator.dimension()
    );
    println!("  {} {}", style("Data dir").dim(), state.data_dir.display());
    println!();

    if stats.by_type.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Item type").fg(Color::White),
        Cell::new("Count").fg(Color::White),
    ]);

    for (item_type, count) in &stats.by_type {
        table.add_row(vec![
            Cell::new(item_type).fg(Color::Cyan),
            Cell::new(count),
        ]);
    }

    println!("{table}");
    println!();

    Ok(())
}
