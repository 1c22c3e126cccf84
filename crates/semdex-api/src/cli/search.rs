//! `semdex search`: rank stored items against a text or a stored item.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use semdex_types::search::{SearchQuery, SearchRequest};

use crate::state::AppState;

/// Characters of result text shown per table row.
const PREVIEW_CHARS: usize = 80;

pub async fn search(
    state: &AppState,
    text: Option<String>,
    item_type: Option<String>,
    item_id: Option<String>,
    top_k: Option<i64>,
    include_self: bool,
    json: bool,
) -> Result<()> {
    let query = SearchQuery::new(text, item_type, item_id)?;
    let top_k = top_k.unwrap_or(state.config.search.default_top_k);
    let request = SearchRequest::new(query, top_k).with_exclude_self(!include_self);

    let response = state.index.search(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    if response.results.is_empty() {
        println!("  {} No similar items found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);

    for (rank, item) in response.results.iter().enumerate() {
        let score_color = if item.score >= 0.5 {
            Color::Green
        } else if item.score > 0.0 {
            Color::Yellow
        } else {
            Color::DarkGrey
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{:.3}", item.score)).fg(score_color),
            Cell::new(&item.item_type).fg(Color::Cyan),
            Cell::new(&item.item_id).fg(Color::Cyan),
            Cell::new(semdex_core::similarity::rank::truncate_for_display(
                &item.text,
                PREVIEW_CHARS,
            ))
            .fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!(
        "  {} result{}",
        response.total_found,
        if response.total_found == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
