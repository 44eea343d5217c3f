//! 拡張機能カタログ
//!
//! リポジトリから取得したマニフェストとインストール済み拡張機能を突き合わせ、
//! 状態付きの一覧（未ダウンロード / 無効 / 有効）を組み立てる。

mod cache;
mod reconcile;

pub use cache::{RepositoryCache, RepositoryCacheStore};
pub use reconcile::reconcile;

use crate::manifest::ExtensionManifest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 拡張機能の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionState {
    NotDownloaded,
    Disabled,
    Enabled,
}

impl ExtensionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionState::NotDownloaded => "not downloaded",
            ExtensionState::Disabled => "disabled",
            ExtensionState::Enabled => "enabled",
        }
    }

    /// 有効フラグから状態を決める
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            ExtensionState::Enabled
        } else {
            ExtensionState::Disabled
        }
    }

    pub fn is_installed(&self) -> bool {
        !matches!(self, ExtensionState::NotDownloaded)
    }
}

impl fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 拡張機能の発見元
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "url", rename_all = "snake_case")]
pub enum ExtensionSource {
    /// 同梱の拡張機能
    Core,
    /// devSearchPaths から読み込んだ開発中の拡張機能
    Developer,
    /// 出所不明のローカル拡張機能
    Local,
    /// リポジトリ（URL）から取得した拡張機能
    Repository(String),
}

impl fmt::Display for ExtensionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionSource::Core => write!(f, "core"),
            ExtensionSource::Developer => write!(f, "developer"),
            ExtensionSource::Local => write!(f, "local"),
            ExtensionSource::Repository(url) => write!(f, "{}", url),
        }
    }
}

/// カタログ上の拡張機能
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoonbaseExtension {
    pub id: String,
    pub unique_id: u64,
    pub manifest: ExtensionManifest,
    /// リポジトリ経由の場合のダウンロードURL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    pub source: ExtensionSource,
    pub state: ExtensionState,
}

/// 1リポジトリ分の取得結果（マニフェストは未検証のJSON）
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryListing {
    pub repository: String,
    pub entries: Vec<serde_json::Value>,
}

impl RepositoryListing {
    pub fn new(repository: impl Into<String>, entries: Vec<serde_json::Value>) -> Self {
        Self {
            repository: repository.into(),
            entries,
        }
    }
}

/// プロセス内で一意な数値IDの払い出し
///
/// 同じ拡張機能IDには常に同じ番号を返し、番号を別のIDに再利用しない。
#[derive(Debug, Default)]
pub struct UniqueIds {
    next: u64,
    assigned: HashMap<String, u64>,
}

impl UniqueIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDを観測し、割り当て済みの番号（無ければ新規）を返す
    pub fn observe(&mut self, id: &str) -> u64 {
        if let Some(unique_id) = self.assigned.get(id) {
            return *unique_id;
        }
        let unique_id = self.next;
        self.next += 1;
        self.assigned.insert(id.to_string(), unique_id);
        unique_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_are_stable_per_id() {
        let mut ids = UniqueIds::new();
        let a = ids.observe("a");
        let b = ids.observe("b");
        assert_ne!(a, b);
        assert_eq!(ids.observe("a"), a);
        assert_eq!(ids.observe("b"), b);
    }

    #[test]
    fn test_unique_ids_are_monotonic() {
        let mut ids = UniqueIds::new();
        let first = ids.observe("x");
        let second = ids.observe("y");
        let third = ids.observe("z");
        assert!(first < second && second < third);
    }

    #[test]
    fn test_state_from_enabled() {
        assert_eq!(ExtensionState::from_enabled(true), ExtensionState::Enabled);
        assert_eq!(ExtensionState::from_enabled(false), ExtensionState::Disabled);
        assert!(!ExtensionState::NotDownloaded.is_installed());
        assert!(ExtensionState::Disabled.is_installed());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ExtensionSource::Developer.to_string(), "developer");
        assert_eq!(
            ExtensionSource::Repository("https://example.com/repo.json".to_string()).to_string(),
            "https://example.com/repo.json"
        );
    }

    #[test]
    fn test_source_serde() {
        let source = ExtensionSource::Repository("https://example.com/r.json".to_string());
        let json = serde_json::to_string(&source).unwrap();
        assert_eq!(json, r#"{"type":"repository","url":"https://example.com/r.json"}"#);
        let parsed: ExtensionSource = serde_json::from_str(r#"{"type":"local"}"#).unwrap();
        assert_eq!(parsed, ExtensionSource::Local);
    }
}
