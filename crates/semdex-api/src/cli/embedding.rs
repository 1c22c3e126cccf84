//! Embedding record CLI commands: store, show, purge.

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;

use semdex_core::repository::vector::VectorStore;
use semdex_types::embedding::PurgeFilter;

use crate::state::AppState;

/// Embed `text` and store it under `(item_type, item_id)`.
pub async fn store(
    state: &AppState,
    item_type: &str,
    item_id: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    let stored = state
        .index
        .store_embedding(item_type, item_id, text)
        .await
        .context("Invalid item key")?;

    if json {
        let result = serde_json::json!({
            "item_type": item_type,
            "item_id": item_id,
            "stored": stored,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if stored {
        println!();
        println!(
            "  {} Stored '{}/{}'",
            style("ok").green(),
            style(item_type).cyan(),
            style(item_id).cyan(),
        );
        println!();
    }

    if !stored {
        bail!("Failed to store embedding for {item_type}/{item_id}");
    }

    Ok(())
}

/// Show one stored record.
pub async fn show(state: &AppState, item_type: &str, item_id: &str, json: bool) -> Result<()> {
    let record = state
        .index
        .get_record(item_type, item_id)
        .await
        .with_context(|| format!("Failed to read {item_type}/{item_id}"))?;

    let Some(record) = record else {
        if json {
            println!("{}", serde_json::json!(null));
            return Ok(());
        }
        bail!("No embedding stored for {item_type}/{item_id}");
    };

    if json {
        let result = serde_json::json!({
            "item_type": record.item_type,
            "item_id": record.item_id,
            "dimension": record.dimension(),
            "text": record.source_text,
            "created_at": record.created_at.to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}/{}",
        style("Embedding").bold(),
        style(&record.item_type).cyan(),
        style(&record.item_id).cyan(),
    );
    println!();
    println!("  {:<12} {}", style("Dimension").dim(), record.dimension());
    println!(
        "  {:<12} {}",
        style("Updated").dim(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {:<12} {}", style("Text").dim(), record.source_text);
    println!();

    Ok(())
}

/// Delete records matching the filter, confirming first unless `force`.
pub async fn purge(
    state: &AppState,
    item_type: Option<String>,
    id_pattern: Option<String>,
    force: bool,
    json: bool,
) -> Result<()> {
    let filter = PurgeFilter::from_parts(item_type, id_pattern);

    if !force && !json {
        let total = state.index.vector_store().total_count().await?;
        if total == 0 {
            println!("  {} Nothing to delete.", style("i").blue().bold());
            return Ok(());
        }

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {}? This cannot be undone.",
                style(&filter).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let deleted = state.index.purge(&filter).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        println!(
            "  {} Deleted {} embedding{}.",
            style("x").red().bold(),
            deleted,
            if deleted == 1 { "" } else { "s" },
        );
    }

    Ok(())
}
