//! moonbase sync コマンド
//!
//! 全リポジトリを取得し直してカタログのキャッシュを更新する。

use super::open_moonbase;
use clap::Parser;
use moonbase::catalog::{ExtensionState, MoonbaseExtension};
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {}

pub async fn run(_args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;
    let repositories = app.repositories().len();

    let refresh = app.refresh_catalog().await.map_err(|e| e.to_string())?;

    for (url, error) in &refresh.failures {
        eprintln!("{} Failed to fetch {}: {}", "!".yellow(), url, error);
    }

    let (available, installed) = count_by_state(&refresh.extensions);
    let fetched = repositories.saturating_sub(refresh.failures.len());
    let marker = if refresh.failures.is_empty() {
        "✓".green().to_string()
    } else {
        "!".yellow().to_string()
    };
    println!(
        "{} Synced {}/{} repositories: {} available, {} installed",
        marker, fetched, repositories, available, installed
    );

    if refresh.failures.len() == repositories && repositories > 0 {
        return Err("All repositories failed to fetch".to_string());
    }
    Ok(())
}

/// (未インストール, インストール済み) の件数
fn count_by_state(extensions: &[MoonbaseExtension]) -> (usize, usize) {
    let available = extensions
        .iter()
        .filter(|ext| ext.state == ExtensionState::NotDownloaded)
        .count();
    (available, extensions.len() - available)
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
