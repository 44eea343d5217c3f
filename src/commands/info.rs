//! moonbase info コマンド
//!
//! 拡張機能の詳細と実効設定を表示する。

use super::open_moonbase;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};
use moonbase::catalog::MoonbaseExtension;
use moonbase::config::EffectiveConfig;
use moonbase::settings::SettingsSchema;

#[derive(Debug, Parser)]
pub struct Args {
    /// 拡張機能ID
    pub id: String,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;

    let ext = match app.find(&args.id) {
        Ok(ext) => ext,
        // カタログに無くてもインストール済みなら表示する
        Err(e) => app
            .registry()
            .get(&args.id)
            .map(|installed| installed.to_extension())
            .ok_or_else(|| e.to_string())?,
    };
    let location = app.registry().get(&args.id).map(|i| i.location);
    let effective = app.effective_config(&args.id).map_err(|e| e.to_string())?;

    println!("Extension Information");
    println!("=====================");
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in detail_rows(&ext) {
        table.add_row(vec![field.to_string(), value]);
    }
    if let Some(location) = location {
        table.add_row(vec!["Location".to_string(), location.display().to_string()]);
    }
    println!("{table}");
    println!();

    if !ext.manifest.settings.is_empty() {
        println!("Settings");
        println!("--------");
        println!("{}", settings_table(&ext.manifest.settings, &effective));
    }

    Ok(())
}

/// 基本情報の行
fn detail_rows(ext: &MoonbaseExtension) -> Vec<(&'static str, String)> {
    let manifest = &ext.manifest;
    let meta = &manifest.meta;
    let join = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    let authors: Vec<String> = meta.authors.iter().map(|a| a.name().to_string()).collect();

    let mut rows = vec![
        ("ID", ext.id.clone()),
        ("Name", manifest.display_name().to_string()),
        (
            "Version",
            manifest.version.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("State", ext.state.to_string()),
        ("Source", ext.source.to_string()),
        (
            "Description",
            meta.description
                .clone()
                .or_else(|| meta.tagline.clone())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Authors", join(&authors)),
        ("Tags", join(&meta.tags)),
        ("Dependencies", join(&manifest.dependencies)),
    ];
    if meta.deprecated {
        rows.push(("Deprecated", "yes".to_string()));
    }
    if let Some(download) = &ext.download {
        rows.push(("Download", download.clone()));
    }
    rows
}

fn settings_table(schema: &SettingsSchema, effective: &EffectiveConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Key", "Type", "Value", "Description"]);

    for (key, descriptor) in schema {
        let value = effective
            .config
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            descriptor
                .display_name
                .clone()
                .unwrap_or_else(|| key.clone()),
            descriptor.kind.to_string(),
            value,
            descriptor.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

#[cfg(test)]
#[path = "info_test.rs"]
mod tests;
