//! 実効設定の算出
//!
//! 永続化された設定（有効フラグ + 上書き値）とスキーマのデフォルト値を
//! マージし、1つの拡張機能が実行時に使う設定を求める。

use super::Config;
use crate::settings::{validate, SettingsSchema};
use serde::Serialize;
use serde_json::{Map, Value};

/// 拡張機能の実効設定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub enabled: bool,
    pub config: Map<String, Value>,
}

/// 実効設定を求める
///
/// - エントリが無い: 無効、スキーマのデフォルト値のみ
/// - 旧形式（真偽値）: `{enabled: value, config: {}}` として扱う
/// - 新形式: `enabled` はそのまま、`config` はスキーマで検証した値
///
/// 検証で置き換えた値は警告ログに出す。同じ入力には常に同じ結果を返す。
pub fn effective_config(id: &str, config: &Config, schema: &SettingsSchema) -> EffectiveConfig {
    let empty = Map::new();
    let (enabled, overrides) = match config.entry(id) {
        Some(entry) => (entry.enabled(), entry.overrides().unwrap_or(&empty)),
        None => (false, &empty),
    };

    let validated = validate(schema, overrides);
    for warning in &validated.warnings {
        tracing::warn!(extension = id, "Invalid setting {}", warning);
    }

    EffectiveConfig {
        enabled,
        config: validated.values,
    }
}

#[cfg(test)]
#[path = "effective_test.rs"]
mod tests;
