use super::RepositoryListing;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// キャッシュされたリポジトリ情報
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCache {
    pub repository: String,
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<serde_json::Value>,
}

impl RepositoryCache {
    /// 取得結果からキャッシュを作成
    pub fn from_listing(listing: &RepositoryListing) -> Self {
        Self {
            repository: listing.repository.clone(),
            fetched_at: Utc::now(),
            entries: listing.entries.clone(),
        }
    }

    pub fn into_listing(self) -> RepositoryListing {
        RepositoryListing::new(self.repository, self.entries)
    }
}

/// リポジトリキャッシュの保存先
///
/// `~/.moonbase/cache/repositories/` にリポジトリごとのJSONを置く。
pub struct RepositoryCacheStore {
    cache_dir: PathBuf,
}

impl RepositoryCacheStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// キャッシュファイルパスを取得
    ///
    /// URL をそのままファイル名にできないため英数字以外を `_` に置き換える。
    fn cache_path(&self, repository: &str) -> PathBuf {
        let name: String = repository
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", name))
    }

    /// キャッシュを取得
    pub fn get(&self, repository: &str) -> Result<Option<RepositoryCache>> {
        let path = self.cache_path(repository);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let cache: RepositoryCache = serde_json::from_str(&content)?;
        Ok(Some(cache))
    }

    /// キャッシュを保存
    pub fn store(&self, cache: &RepositoryCache) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_path(&cache.repository);
        let content = serde_json::to_string_pretty(cache)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// キャッシュを削除
    pub fn remove(&self, repository: &str) -> Result<()> {
        let path = self.cache_path(repository);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// 指定順にキャッシュ済みの取得結果を集める（未取得のリポジトリは飛ばす）
    pub fn listings(&self, repositories: &[String]) -> Result<Vec<RepositoryListing>> {
        let mut listings = Vec::new();
        for repository in repositories {
            match self.get(repository) {
                Ok(Some(cache)) => listings.push(cache.into_listing()),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    repository = %repository,
                    "Ignoring unreadable repository cache: {}",
                    e
                ),
            }
        }
        Ok(listings)
    }
}
