//! 拡張機能マニフェスト
//!
//! 拡張機能の `manifest.json` と、リポジトリが配信するマニフェスト（ダウンロードURL付き）の定義。

use crate::error::{MoonbaseError, Result};
use crate::settings::SettingsSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// マニフェストファイル名
pub const MANIFEST_FILE: &str = "manifest.json";

/// 作者情報（文字列のみ、または名前とIDの組）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionAuthor {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl ExtensionAuthor {
    /// 表示名
    pub fn name(&self) -> &str {
        match self {
            ExtensionAuthor::Name(name) => name,
            ExtensionAuthor::Detailed { name, .. } => name,
        }
    }
}

/// 表示用メタデータ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<ExtensionAuthor>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donate: Option<String>,
}

/// 拡張機能マニフェスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_level: Option<u32>,
    #[serde(default)]
    pub meta: ExtensionMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incompatible: Vec<String>,
    #[serde(default, skip_serializing_if = "SettingsSchema::is_empty")]
    pub settings: SettingsSchema,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cors: Vec<String>,
}

impl ExtensionManifest {
    /// 最小構成のマニフェストを作成
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            api_level: None,
            meta: ExtensionMeta::default(),
            dependencies: Vec::new(),
            suggested: Vec::new(),
            incompatible: Vec::new(),
            settings: SettingsSchema::new(),
            cors: Vec::new(),
        }
    }

    /// 表示名（meta.name が無ければ id）
    pub fn display_name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or(&self.id)
    }

    /// 構造上の検証
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MoonbaseError::InvalidManifest(
                "extension id cannot be empty".to_string(),
            ));
        }
        // id はインストール先のディレクトリ名になる
        if self.id.starts_with('.') || self.id.contains(['/', '\\']) {
            return Err(MoonbaseError::InvalidManifest(format!(
                "extension id '{}' is not a valid directory name",
                self.id
            )));
        }
        Ok(())
    }

    /// ディレクトリ内の manifest.json を読み込む
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)?;
        let manifest: Self = serde_json::from_str(&content).map_err(|e| {
            MoonbaseError::InvalidManifest(format!("{}: {}", path.display(), e))
        })?;
        manifest.validate()?;
        Ok(manifest)
    }
}

/// リポジトリが配信するマニフェスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryManifest {
    #[serde(flatten)]
    pub manifest: ExtensionManifest,
    pub download: String,
}

impl RepositoryManifest {
    /// 生のJSON値からパース（不正な場合は Err）
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let parsed: Self = serde_json::from_value(value)
            .map_err(|e| MoonbaseError::InvalidManifest(e.to_string()))?;
        parsed.manifest.validate()?;
        if parsed.download.trim().is_empty() {
            return Err(MoonbaseError::InvalidManifest(format!(
                "extension '{}' has no download url",
                parsed.manifest.id
            )));
        }
        Ok(parsed)
    }

    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
