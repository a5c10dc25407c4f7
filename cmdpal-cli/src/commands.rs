//! Subcommand implementations

use anyhow::{Context, Result};
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::warn;

use cmdpal_core::{Command, CommandLibrary, Deployment, NewCustomEntry, PaletteConfig, SyncOutcome};

/// Which table `list` reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Catalog,
    Custom,
}

impl ListFilter {
    pub fn from_flags(custom: bool, catalog: bool) -> Self {
        match (custom, catalog) {
            (true, _) => ListFilter::Custom,
            (_, true) => ListFilter::Catalog,
            _ => ListFilter::All,
        }
    }

    fn matches(self, command: &Command) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Catalog => !command.is_custom(),
            ListFilter::Custom => command.is_custom(),
        }
    }
}

pub async fn sync(library: &CommandLibrary) -> Result<()> {
    let outcome = library.reconcile().await;
    println!("{outcome}");
    match outcome {
        SyncOutcome::Failed { error, .. } => Err(error).context("Catalog sync failed"),
        _ => Ok(()),
    }
}

/// Table row for stored commands
#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Syntax")]
    syntax: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Source")]
    source: &'static str,
}

impl From<&Command> for CommandRow {
    fn from(command: &Command) -> Self {
        Self {
            id: command.id.clone(),
            name: command.name.clone(),
            platform: command.platform.clone(),
            syntax: command
                .primary_variation()
                .map(|v| v.syntax.clone())
                .unwrap_or_default(),
            tags: command.tags.join(", "),
            source: if command.is_custom() { "custom" } else { "catalog" },
        }
    }
}

pub async fn list(
    library: &CommandLibrary,
    filter: ListFilter,
    json_output: bool,
    refresh: bool,
) -> Result<()> {
    if refresh {
        let outcome = library.reconcile().await;
        if !outcome.is_success() {
            warn!("Listing local data: {outcome}");
        }
    }

    let commands: Vec<Command> = library
        .all_commands()
        .await?
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(());
    }

    if commands.is_empty() {
        println!("No commands stored.");
        if filter != ListFilter::Custom {
            println!("\nRun 'cmdpal sync' to download the command catalog.");
        }
        return Ok(());
    }

    let rows: Vec<CommandRow> = commands.iter().map(CommandRow::from).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    println!("\n{} commands (catalog version {})", rows.len(), library.local_version());
    Ok(())
}

pub fn entry_from_args(
    name: &str,
    syntax: &str,
    description: Option<&str>,
    tags: Option<&str>,
) -> NewCustomEntry {
    let mut entry = NewCustomEntry::new(name, syntax);
    if let Some(description) = description {
        entry = entry.with_description(description);
    }
    if let Some(tags) = tags {
        entry = entry.with_tags(tags);
    }
    entry
}

/// Parse a custom entry from a JSON file; omitted id, platform and category
/// take their custom defaults
pub fn read_entry_file(path: &Path) -> Result<NewCustomEntry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse custom command from {}", path.display()))
}

pub async fn add(library: &CommandLibrary, entry: NewCustomEntry) -> Result<()> {
    let added = library.add_custom_entry(entry).await?;
    println!("Added custom command '{}' ({})", added.name, added.id);
    Ok(())
}

pub async fn remove(library: &CommandLibrary, id: &str) -> Result<()> {
    let removed = library.delete_custom_entry(id).await?;
    println!("{}", removal_message(id, removed));
    Ok(())
}

fn removal_message(id: &str, removed: bool) -> String {
    if removed {
        format!("Removed custom command {id}")
    } else {
        format!("No custom command with id '{id}'; nothing to remove")
    }
}

pub fn show_config(
    path: &Path,
    config: &PaletteConfig,
    deployment: Deployment,
    save: bool,
) -> Result<()> {
    if save {
        config.save_to_path(path)?;
        println!("Saved configuration to {}\n", path.display());
    }

    println!("Config file:  {}", path.display());
    println!("Version URL:  {}", config.version_url);
    println!("Database:     {}", config.database_path(deployment)?.display());
    println!("Timeout:      {}s", config.timeout().as_secs());
    println!("Deployment:   {deployment:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_filter_from_flags() {
        assert_eq!(ListFilter::from_flags(false, false), ListFilter::All);
        assert_eq!(ListFilter::from_flags(true, false), ListFilter::Custom);
        assert_eq!(ListFilter::from_flags(false, true), ListFilter::Catalog);
    }

    #[test]
    fn test_removal_message() {
        assert_eq!(removal_message("custom-1", true), "Removed custom command custom-1");
        assert!(removal_message("custom-1", false).contains("nothing to remove"));
    }

    #[test]
    fn test_entry_from_args() {
        let entry = entry_from_args(
            "  Restart nginx ",
            "sudo systemctl restart nginx",
            Some("Restart the web server"),
            Some("web, ops,"),
        );
        assert_eq!(entry.name, "Restart nginx");
        assert_eq!(entry.tags, vec!["web", "ops"]);
        assert_eq!(entry.variations.len(), 1);
        assert_eq!(entry.variations[0].description, "Restart the web server");
        assert!(entry.variations[0].is_primary);
        assert!(entry.id.starts_with("custom-"));
    }

    #[test]
    fn test_read_entry_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.json");
        std::fs::write(
            &path,
            r#"{
                "name": "Tail logs",
                "tags": "logs, debug",
                "variations": [{"syntax": "tail -f /var/log/syslog", "isPrimary": true}]
            }"#,
        )
        .unwrap();

        let entry = read_entry_file(&path).unwrap();
        assert_eq!(entry.name, "Tail logs");
        assert_eq!(entry.platform, "custom");
        assert_eq!(entry.category, "Custom");
        assert_eq!(entry.tags, vec!["logs", "debug"]);
        assert!(entry.id.starts_with("custom-"));
    }

    #[test]
    fn test_read_entry_file_rejects_missing_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.json");
        std::fs::write(&path, r#"{"variations": []}"#).unwrap();
        assert!(read_entry_file(&path).is_err());
    }
}
