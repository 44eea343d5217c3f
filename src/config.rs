//! 永続化される設定と HTTP 設定
//!
//! `config.json` のスキーマ。拡張機能ごとのエントリは旧形式（真偽値のみ）と
//! 新形式（`enabled` + `config`）の両方を受け付け、値の型で判別する。

mod effective;

pub use effective::{effective_config, EffectiveConfig};

use crate::error::{MoonbaseError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// 既定のリポジトリ
pub const DEFAULT_REPOSITORY: &str = "https://moonlight-mod.github.io/extensions-dist/repo.json";

/// 拡張機能ごとのユーザー設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigExtension {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

/// 拡張機能エントリ
///
/// 旧形式 `{"id": true}` と新形式 `{"id": {"enabled": true, "config": {...}}}`。
/// 読み込み時に形式を書き換えることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionEntry {
    Legacy(bool),
    Full(ConfigExtension),
}

impl ExtensionEntry {
    pub fn enabled(&self) -> bool {
        match self {
            ExtensionEntry::Legacy(enabled) => *enabled,
            ExtensionEntry::Full(ext) => ext.enabled,
        }
    }

    /// 保存済みの上書き値（旧形式は常に None）
    pub fn overrides(&self) -> Option<&Map<String, Value>> {
        match self {
            ExtensionEntry::Legacy(_) => None,
            ExtensionEntry::Full(ext) => ext.config.as_ref(),
        }
    }

    /// 新形式に変換
    fn into_full(self) -> ConfigExtension {
        match self {
            ExtensionEntry::Legacy(enabled) => ConfigExtension {
                enabled,
                config: None,
            },
            ExtensionEntry::Full(ext) => ext,
        }
    }
}

/// config.json のルート構造
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionEntry>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_search_paths: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_all: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: BTreeMap::new(),
            repositories: vec![DEFAULT_REPOSITORY.to_string()],
            dev_search_paths: None,
            logger_level: None,
            patch_all: None,
        }
    }
}

impl Config {
    pub fn entry(&self, id: &str) -> Option<&ExtensionEntry> {
        self.extensions.get(id)
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.entry(id).is_some_and(ExtensionEntry::enabled)
    }

    /// 有効/無効を設定
    ///
    /// 旧形式のエントリは旧形式のまま更新する。
    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        match self.extensions.get_mut(id) {
            Some(ExtensionEntry::Legacy(value)) => *value = enabled,
            Some(ExtensionEntry::Full(ext)) => ext.enabled = enabled,
            None => {
                self.extensions.insert(
                    id.to_string(),
                    ExtensionEntry::Full(ConfigExtension {
                        enabled,
                        config: None,
                    }),
                );
            }
        }
    }

    /// 設定値を上書き（旧形式は新形式に変換される）
    pub fn set_setting(&mut self, id: &str, key: &str, value: Value) {
        let mut ext = self
            .extensions
            .remove(id)
            .map(ExtensionEntry::into_full)
            .unwrap_or_default();
        ext.config
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self.extensions
            .insert(id.to_string(), ExtensionEntry::Full(ext));
    }

    /// 上書き値を削除。削除した値を返す
    pub fn remove_setting(&mut self, id: &str, key: &str) -> Option<Value> {
        match self.extensions.get_mut(id) {
            Some(ExtensionEntry::Full(ext)) => ext.config.as_mut()?.remove(key),
            _ => None,
        }
    }

    /// エントリを削除
    pub fn remove_extension(&mut self, id: &str) -> Option<ExtensionEntry> {
        self.extensions.remove(id)
    }

    /// 実効設定を書き戻す
    pub fn apply_effective(&mut self, id: &str, effective: &EffectiveConfig) {
        self.extensions.insert(
            id.to_string(),
            ExtensionEntry::Full(ConfigExtension {
                enabled: effective.enabled,
                config: Some(effective.config.clone()),
            }),
        );
    }

    /// リポジトリを追加
    pub fn add_repository(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(MoonbaseError::Config(format!(
                "Repository must be an http(s) URL: {}",
                url
            )));
        }
        if self.repositories.iter().any(|r| r == url) {
            return Err(MoonbaseError::Config(format!(
                "Repository '{}' already exists",
                url
            )));
        }
        self.repositories.push(url.to_string());
        Ok(())
    }

    /// リポジトリを削除
    pub fn remove_repository(&mut self, url: &str) -> Result<()> {
        let idx = self
            .repositories
            .iter()
            .position(|r| r == url)
            .ok_or_else(|| MoonbaseError::RepositoryNotFound(url.to_string()))?;
        self.repositories.remove(idx);
        Ok(())
    }
}

/// 設定ファイル（config.json）
pub struct ConfigFile {
    path: PathBuf,
    config: Config,
}

impl ConfigFile {
    /// ファイルから読み込む。存在しなければ既定値
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path,
                config: Config::default(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            MoonbaseError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Self { path, config })
    }

    /// アトミックに保存
    ///
    /// 同一ディレクトリに一時ファイルを作成し、persist() でリネームする。
    pub fn save(&self) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        let json = serde_json::to_string_pretty(&self.config)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

/// HTTP設定
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// タイムアウト（秒）
    pub timeout: Option<Duration>,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: "moonbase".to_string(),
        }
    }
}

impl HttpConfig {
    /// reqwest::Client を構築
    pub fn build_client(&self) -> Client {
        let mut builder = Client::builder().user_agent(&self.user_agent);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().unwrap_or_else(|_| Client::new())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
