//! インストールメタデータ
//!
//! インストール元リポジトリやインストール日時を `.moonbase-meta.json` で管理する。
//! 拡張機能の `manifest.json` は上流成果物として改変しない。

use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// メタデータファイル名
pub const META_FILE: &str = ".moonbase-meta.json";

/// Moonbase が管理するインストールメタデータ
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallMeta {
    /// インストール元リポジトリ
    #[serde(default)]
    pub repository: Option<String>,
    /// インストール日時（RFC3339形式）
    #[serde(default)]
    pub installed_at: Option<String>,
}

impl InstallMeta {
    /// 現在時刻でメタデータを作成
    pub fn now(repository: &str) -> Self {
        Self {
            repository: Some(repository.to_string()),
            installed_at: Some(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        }
    }
}

/// メタデータを書き込む（アトミック書き込み）
pub fn write_meta(extension_dir: &Path, meta: &InstallMeta) -> Result<()> {
    let meta_path = extension_dir.join(META_FILE);

    let mut temp_file = NamedTempFile::new_in(extension_dir)?;
    let json = serde_json::to_string_pretty(meta)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.flush()?;

    temp_file.persist(&meta_path).map_err(|e| e.error)?;
    Ok(())
}

/// メタデータを読み込む
///
/// 欠損時は None、破損時は警告ログを出して None を返す。
pub fn load_meta(extension_dir: &Path) -> Option<InstallMeta> {
    let meta_path = extension_dir.join(META_FILE);

    if !meta_path.exists() {
        return None;
    }

    match fs::read_to_string(&meta_path) {
        Ok(content) => match serde_json::from_str::<InstallMeta>(&content) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(
                    "{} is corrupted ({}), treating {} as a local extension",
                    META_FILE,
                    e,
                    extension_dir.display()
                );
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {} ({})", meta_path.display(), e);
            None
        }
    }
}
