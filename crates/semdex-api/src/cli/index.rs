//! `semdex index`: bulk-index items from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use semdex_types::embedding::{IndexItem, IndexOptions};

use crate::state::AppState;

/// Read a JSON array of `{ "id": ..., "text": ... }` objects.
pub async fn read_items(path: &Path) -> Result<Vec<IndexItem>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let items: Vec<IndexItem> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of {{id, text}} items", path.display()))?;
    Ok(items)
}

pub async fn index(
    state: &AppState,
    item_type: &str,
    file: &Path,
    options: IndexOptions,
    json: bool,
) -> Result<()> {
    let items = read_items(file).await?;

    if !json {
        println!();
        println!(
            "  Indexing {} item{} as '{}'...",
            items.len(),
            if items.len() == 1 { "" } else { "s" },
            style(item_type).cyan(),
        );
    }

    let report = state.index.index_items(item_type, &items, options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "  {} {} indexed, {} skipped, {} failed",
        style("ok").green(),
        style(report.indexed).green().bold(),
        report.skipped,
        if report.failed > 0 {
            style(report.failed).red().bold()
        } else {
            style(report.failed)
        },
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        tokio::fs::write(
            &path,
            r#"[{"id": "t1", "text": "book hotel"}, {"id": "t2", "text": ""}]"#,
        )
        .await
        .unwrap();

        let items = read_items(&path).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "t1");
        assert_eq!(items[1].text, "");
    }

    #[tokio::test]
    async fn test_read_items_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        tokio::fs::write(&path, r#"{"id": "t1"}"#).await.unwrap();

        assert!(read_items(&path).await.is_err());
    }
}
