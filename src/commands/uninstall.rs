use super::open_moonbase;
use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{self, Write};

#[derive(Debug, Parser)]
pub struct Args {
    /// 拡張機能ID
    pub id: String,

    /// 確認プロンプトをスキップ
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;

    // 事前チェック: インストール済みか
    let installed = app
        .registry()
        .get(&args.id)
        .ok_or_else(|| format!("Extension '{}' is not installed", args.id))?;

    println!(
        "{} Extension: {} ({})",
        "i".blue(),
        installed.manifest.display_name().bold(),
        installed.state
    );
    println!("  Location: {}", installed.location.display());
    println!();

    if !args.force && !confirm_uninstall(&args.id)? {
        println!("Uninstall cancelled.");
        return Ok(());
    }

    app.uninstall(&args.id).await.map_err(|e| e.to_string())?;
    println!(
        "{} Extension '{}' uninstalled successfully.",
        "✓".green(),
        args.id
    );
    Ok(())
}

/// ユーザーに削除確認を求める
fn confirm_uninstall(id: &str) -> Result<bool, String> {
    print!("Are you sure you want to uninstall '{}'? [y/N]: ", id);
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| e.to_string())?;

    Ok(is_confirmation(&input))
}

fn is_confirmation(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
#[path = "uninstall_test.rs"]
mod tests;
