//! moonbase config コマンド
//!
//! 拡張機能の実効設定を表示し、`--set` / `--unset` で上書き値を変更する。

use super::open_moonbase;
use clap::Parser;
use moonbase::config::EffectiveConfig;
use owo_colors::OwoColorize;
use serde_json::Value;

#[derive(Debug, Parser)]
pub struct Args {
    /// 拡張機能ID
    pub id: String,

    /// 設定値を上書き（key=value、value は JSON。解釈できなければ文字列）
    #[arg(long, value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// 上書き値を削除
    #[arg(long, value_name = "KEY")]
    pub unset: Vec<String>,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;

    let assignments = args
        .set
        .iter()
        .map(|s| parse_assignment(s))
        .collect::<Result<Vec<_>, _>>()?;

    for key in &args.unset {
        match app.unset_setting(&args.id, key).map_err(|e| e.to_string())? {
            Some(_) => println!("{} Unset '{}'.", "✓".green(), key),
            None => println!("{} '{}' was not set.", "•".yellow(), key),
        }
    }
    for (key, value) in assignments {
        app.set_setting(&args.id, &key, value.clone())
            .map_err(|e| e.to_string())?;
        println!("{} Set '{}' to {}.", "✓".green(), key, value);
    }

    let effective = app.effective_config(&args.id).map_err(|e| e.to_string())?;
    print_effective(&effective)
}

/// `key=value` を分解する
fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("Invalid assignment '{}': expected KEY=VALUE", input))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid assignment '{}': key is empty", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn print_effective(effective: &EffectiveConfig) -> Result<(), String> {
    serde_json::to_string_pretty(effective)
        .map(|json| println!("{json}"))
        .map_err(|e| format!("Failed to serialize config: {}", e))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
