use super::open_moonbase;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured repositories
    #[command(
        long_about = "Display all configured extension repositories with their cached extension counts."
    )]
    List,

    /// Add a repository
    #[command(
        long_about = "Add an extension repository. The URL must point to a JSON array of extension manifests."
    )]
    Add {
        /// Repository URL (http or https)
        url: String,
    },

    /// Remove a repository
    #[command(
        long_about = "Remove an extension repository. Installed extensions from this repository are not affected."
    )]
    Remove {
        /// Repository URL
        url: String,
    },
}

pub async fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::List => run_list().await,
        Command::Add { url } => run_add(url).await,
        Command::Remove { url } => run_remove(url).await,
    }
}

async fn run_list() -> Result<(), String> {
    let app = open_moonbase().await?;

    let repositories = app.repositories();
    if repositories.is_empty() {
        println!("No repositories configured.");
        println!("Use 'moonbase repo add <url>' to add a repository.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["URL", "EXTENSIONS", "LAST FETCHED"]);

    for url in &repositories {
        let (count, fetched_at) = match app.cache().get(url) {
            Ok(Some(cache)) => (
                cache.entries.len().to_string(),
                cache.fetched_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
            _ => ("N/A".to_string(), "Never".to_string()),
        };
        table.add_row(vec![url.as_str(), &count, &fetched_at]);
    }

    println!("{table}");
    Ok(())
}

async fn run_add(url: String) -> Result<(), String> {
    let app = open_moonbase().await?;
    app.add_repository(&url).map_err(|e| e.to_string())?;

    println!("{} Added repository '{}'.", "✓".green(), url.trim());
    println!("Run 'moonbase sync' to fetch its extensions.");
    Ok(())
}

async fn run_remove(url: String) -> Result<(), String> {
    let app = open_moonbase().await?;
    app.remove_repository(&url).map_err(|e| e.to_string())?;

    println!("{} Removed repository '{}'.", "✓".green(), url);
    Ok(())
}
