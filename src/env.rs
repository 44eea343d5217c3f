use crate::error::{MoonbaseError, Result};
use std::path::{Path, PathBuf};

/// 環境変数ユーティリティ
pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.is_empty())
    }
}

/// Moonbase のディレクトリ構成
///
/// ```text
/// ~/.moonbase/
/// ├── config.json
/// ├── extensions/<id>/
/// └── cache/repositories/<repo>.json
/// ```
#[derive(Debug, Clone)]
pub struct MoonbasePaths {
    root: PathBuf,
}

impl MoonbasePaths {
    /// $HOME/.moonbase を基点にする
    pub fn from_home() -> Result<Self> {
        let home = EnvVar::get("HOME")
            .ok_or_else(|| MoonbaseError::Config("HOME environment variable not set".to_string()))?;
        Ok(Self::with_root(PathBuf::from(home).join(".moonbase")))
    }

    /// 任意のディレクトリを基点にする（テスト用）
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.root.join("extensions")
    }

    pub fn repository_cache_dir(&self) -> PathBuf {
        self.root.join("cache").join("repositories")
    }
}
