//! moonbase list コマンド
//!
//! キャッシュ済みカタログとインストール済み拡張機能の一覧を表示する。

use super::open_moonbase;
use clap::{Parser, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use moonbase::catalog::{ExtensionState, MoonbaseExtension};
use owo_colors::OwoColorize;

/// 状態フィルタ
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum StateFilter {
    NotDownloaded,
    Disabled,
    Enabled,
    /// Disabled と Enabled の両方
    Installed,
}

impl StateFilter {
    fn matches(&self, state: ExtensionState) -> bool {
        match self {
            StateFilter::NotDownloaded => state == ExtensionState::NotDownloaded,
            StateFilter::Disabled => state == ExtensionState::Disabled,
            StateFilter::Enabled => state == ExtensionState::Enabled,
            StateFilter::Installed => state.is_installed(),
        }
    }
}

#[derive(Debug, Parser)]
pub struct Args {
    /// Filter by extension state
    #[arg(long, value_enum)]
    pub state: Option<StateFilter>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;
    let catalog = app.cached_catalog().map_err(|e| e.to_string())?;
    let total_count = catalog.len();

    let filtered = filter_extensions(catalog, args.state);

    if args.json {
        print_json(&filtered)?;
    } else {
        print_table(&filtered, total_count);
    }

    Ok(())
}

fn filter_extensions(
    extensions: Vec<MoonbaseExtension>,
    state: Option<StateFilter>,
) -> Vec<MoonbaseExtension> {
    match state {
        None => extensions,
        Some(filter) => extensions
            .into_iter()
            .filter(|ext| filter.matches(ext.state))
            .collect(),
    }
}

fn colored_state(state: ExtensionState) -> String {
    match state {
        ExtensionState::Enabled => state.green().to_string(),
        ExtensionState::Disabled => state.yellow().to_string(),
        ExtensionState::NotDownloaded => state.dimmed().to_string(),
    }
}

fn print_table(extensions: &[MoonbaseExtension], total_count: usize) {
    if extensions.is_empty() {
        if total_count == 0 {
            println!("No extensions found");
            println!("Run 'moonbase sync' to fetch the catalog.");
        } else {
            println!("No extensions matched");
        }
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Version", "State", "Source"]);

    for ext in extensions {
        table.add_row(vec![
            ext.id.clone(),
            ext.manifest.display_name().to_string(),
            ext.manifest.version.clone().unwrap_or_else(|| "-".to_string()),
            colored_state(ext.state),
            ext.source.to_string(),
        ]);
    }

    println!("{table}");
    println!("{} extension(s)", extensions.len());
}

fn print_json(extensions: &[MoonbaseExtension]) -> Result<(), String> {
    serde_json::to_string_pretty(extensions)
        .map(|json| println!("{json}"))
        .map_err(|e| format!("Failed to serialize extensions: {}", e))
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
