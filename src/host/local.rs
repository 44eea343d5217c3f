//! ローカルホスト実装
//!
//! HTTP でリポジトリと拡張機能アーカイブを取得し、`~/.moonbase/extensions/<id>/`
//! に展開する。

use super::meta::{load_meta, write_meta, InstallMeta};
use super::{DetectedExtension, MoonbaseHost};
use crate::catalog::ExtensionSource;
use crate::config::{ConfigFile, HttpConfig};
use crate::env::MoonbasePaths;
use crate::error::{MoonbaseError, Result};
use crate::http;
use crate::manifest::{ExtensionManifest, RepositoryManifest, MANIFEST_FILE};
use reqwest::Client;
use serde_json::Value;
use std::fs;
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tempfile::TempDir;

/// ローカルホスト
pub struct LocalHost {
    http: Client,
    paths: MoonbasePaths,
}

impl LocalHost {
    pub fn new(paths: MoonbasePaths, config: &HttpConfig) -> Self {
        Self {
            http: config.build_client(),
            paths,
        }
    }

    /// 拡張機能のインストール先
    pub fn extension_dir(&self, id: &str) -> PathBuf {
        self.paths.extensions_dir().join(id)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<Value>> {
        match http::get_json(&self.http, url).await? {
            Value::Array(entries) => Ok(entries),
            _ => Err(MoonbaseError::InvalidManifest(format!(
                "Repository {} did not return a list of extensions",
                url
            ))),
        }
    }

    async fn install(
        &self,
        manifest: &RepositoryManifest,
        url: &str,
        repository: &str,
    ) -> Result<PathBuf> {
        let archive = http::download_with_progress(&self.http, url)
            .await
            .map_err(|e| MoonbaseError::Install {
                id: manifest.id().to_string(),
                reason: e.to_string(),
            })?;
        self.install_from_archive(manifest, &archive, repository)
    }

    /// zip アーカイブから拡張機能をインストール
    ///
    /// 一時ディレクトリに展開してからリネームするため、失敗時に
    /// 既存のインストールや中途半端なディレクトリは残らない。
    pub fn install_from_archive(
        &self,
        manifest: &RepositoryManifest,
        archive: &[u8],
        repository: &str,
    ) -> Result<PathBuf> {
        let id = manifest.id();
        let install_error = |reason: String| MoonbaseError::Install {
            id: id.to_string(),
            reason,
        };

        let target = self.extension_dir(id);
        // 同じ名前のディレクトリに別の拡張機能が入っていたら上書きしない
        if target.join(MANIFEST_FILE).exists() && manifest_id(&target).as_deref() != Some(id) {
            return Err(install_error(format!(
                "{} is occupied by another extension",
                target.display()
            )));
        }

        let extensions_dir = self.paths.extensions_dir();
        fs::create_dir_all(&extensions_dir)?;

        let staging = TempDir::new_in(&extensions_dir)?;
        let mut zip = zip::ZipArchive::new(Cursor::new(archive))
            .map_err(|e| install_error(format!("invalid archive: {}", e)))?;
        zip.extract(staging.path())
            .map_err(|e| install_error(format!("failed to extract archive: {}", e)))?;

        // アーカイブに manifest.json が無ければリポジトリのマニフェストを書き出す
        let manifest_path = staging.path().join(MANIFEST_FILE);
        if !manifest_path.exists() {
            let json = serde_json::to_string_pretty(&manifest.manifest)?;
            fs::write(&manifest_path, json)?;
        }
        write_meta(staging.path(), &InstallMeta::now(repository))?;

        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(staging.path(), &target)?;

        tracing::info!(extension = id, path = %target.display(), "Installed extension");
        Ok(target)
    }

    fn delete(&self, id: &str) -> Result<()> {
        let dir = self
            .installed_dir(id)?
            .ok_or_else(|| MoonbaseError::ExtensionNotFound(id.to_string()))?;
        fs::remove_dir_all(&dir)?;
        tracing::info!(extension = id, path = %dir.display(), "Deleted extension");
        Ok(())
    }

    /// `extensions/` 以下で manifest の id が一致するディレクトリ
    ///
    /// ディレクトリ名と id が一致しない場合もあるため、名前が違えば走査する。
    fn installed_dir(&self, id: &str) -> Result<Option<PathBuf>> {
        let conventional = self.extension_dir(id);
        if manifest_id(&conventional).as_deref() == Some(id) {
            return Ok(Some(conventional));
        }
        Ok(extension_dirs(&self.paths.extensions_dir())?
            .into_iter()
            .find(|dir| manifest_id(dir).as_deref() == Some(id)))
    }

    /// インストール済みと開発用の拡張機能を列挙
    pub fn detect(&self) -> Result<Vec<DetectedExtension>> {
        let mut detected = Vec::new();

        let extensions_dir = self.paths.extensions_dir();
        for dir in extension_dirs(&extensions_dir)? {
            let source = load_meta(&dir)
                .and_then(|meta| meta.repository)
                .map(ExtensionSource::Repository)
                .unwrap_or(ExtensionSource::Local);
            if let Some(found) = load_detected(&dir, source) {
                detected.push(found);
            }
        }

        let config = ConfigFile::load_from(self.paths.config_file())?;
        for search_path in config.config().dev_search_paths.iter().flatten() {
            let search_path = PathBuf::from(search_path);
            // 検索パス自体が拡張機能の場合と、拡張機能を含むディレクトリの場合がある
            if search_path.join(MANIFEST_FILE).exists() {
                if let Some(found) = load_detected(&search_path, ExtensionSource::Developer) {
                    detected.push(found);
                }
                continue;
            }
            for dir in extension_dirs(&search_path)? {
                if let Some(found) = load_detected(&dir, ExtensionSource::Developer) {
                    detected.push(found);
                }
            }
        }

        Ok(detected)
    }

    fn read_config_value(&self, id: &str, key: &str) -> Option<Value> {
        let file = ConfigFile::load_from(self.paths.config_file()).ok()?;
        file.config().entry(id)?.overrides()?.get(key).cloned()
    }
}

/// manifest.json を持つ子ディレクトリ（名前順）
fn extension_dirs(parent: &Path) -> Result<Vec<PathBuf>> {
    if !parent.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(parent)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_dir() && !hidden && path.join(MANIFEST_FILE).exists() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn manifest_id(dir: &Path) -> Option<String> {
    ExtensionManifest::load(dir).ok().map(|manifest| manifest.id)
}

fn load_detected(dir: &Path, source: ExtensionSource) -> Option<DetectedExtension> {
    match ExtensionManifest::load(dir) {
        Ok(manifest) => Some(DetectedExtension {
            manifest,
            source,
            location: dir.to_path_buf(),
        }),
        Err(e) => {
            tracing::warn!("Skipping extension at {}: {}", dir.display(), e);
            None
        }
    }
}

impl MoonbaseHost for LocalHost {
    fn fetch_repository<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>>> + Send + 'a>> {
        Box::pin(self.fetch(url))
    }

    fn install_extension<'a>(
        &'a self,
        manifest: &'a RepositoryManifest,
        url: &'a str,
        repository: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf>> + Send + 'a>> {
        Box::pin(self.install(manifest, url, repository))
    }

    fn delete_extension<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { self.delete(id) })
    }

    fn detect_extensions<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DetectedExtension>>> + Send + 'a>> {
        Box::pin(async move { self.detect() })
    }

    fn get_extension_config(&self, id: &str, key: &str) -> Option<Value> {
        self.read_config_value(id, key)
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
