//! アプリケーション層
//!
//! ホスト・レジストリ・設定ファイル・リポジトリキャッシュをまとめ、
//! CLI から呼ばれるユースケースを提供する。

use crate::catalog::{
    ExtensionSource, ExtensionState, MoonbaseExtension, RepositoryCache, RepositoryCacheStore,
    RepositoryListing,
};
use crate::config::{effective_config, Config, ConfigFile, EffectiveConfig};
use crate::env::MoonbasePaths;
use crate::error::{MoonbaseError, Result};
use crate::host::{fetch_repositories, MoonbaseHost};
use crate::manifest::RepositoryManifest;
use crate::registry::ExtensionRegistry;
use crate::settings::SettingsSchema;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// カタログ更新の結果
#[derive(Debug)]
pub struct CatalogRefresh {
    pub extensions: Vec<MoonbaseExtension>,
    /// 取得に失敗したリポジトリ（キャッシュがあればそれで代替済み）
    pub failures: Vec<(String, MoonbaseError)>,
}

/// Moonbase サービス
pub struct Moonbase {
    host: Arc<dyn MoonbaseHost>,
    registry: ExtensionRegistry,
    config: Mutex<ConfigFile>,
    cache: RepositoryCacheStore,
    /// リポジトリ追加/削除のたびに進む世代番号
    generation: AtomicU64,
}

impl Moonbase {
    /// 設定を読み込み、インストール済みの拡張機能をレジストリに登録する
    pub async fn open(host: Arc<dyn MoonbaseHost>, paths: &MoonbasePaths) -> Result<Self> {
        let config = ConfigFile::load_from(paths.config_file())?;
        let detected = host.detect_extensions().await?;

        let registry = ExtensionRegistry::new();
        registry.seed(detected, config.config());

        Ok(Self {
            host,
            registry,
            config: Mutex::new(config),
            cache: RepositoryCacheStore::new(paths.repository_cache_dir()),
            generation: AtomicU64::new(0),
        })
    }

    fn config_file(&self) -> MutexGuard<'_, ConfigFile> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 設定を変更して保存する。変更が無ければ保存しない。保存に失敗したら変更を戻す
    fn update_config<T>(&self, f: impl FnOnce(&mut Config) -> Result<T>) -> Result<T> {
        let mut file = self.config_file();
        let backup = file.config().clone();
        let result = f(file.config_mut()).and_then(|value| {
            if *file.config() == backup {
                return Ok(value);
            }
            file.save().map(|_| value)
        });
        if result.is_err() {
            *file.config_mut() = backup;
        }
        result
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &RepositoryCacheStore {
        &self.cache
    }

    /// 現在の設定のコピー
    pub fn config(&self) -> Config {
        self.config_file().config().clone()
    }

    pub fn repositories(&self) -> Vec<String> {
        self.config_file().config().repositories.clone()
    }

    // ==================== カタログ ====================

    /// 全リポジトリを並行取得してカタログを作り直す
    ///
    /// 取得中にリポジトリが削除された場合、そのリポジトリの結果は捨てる。
    /// 取得に失敗したリポジトリはキャッシュがあればそれを使う。
    pub async fn refresh_catalog(&self) -> Result<CatalogRefresh> {
        let generation = self.generation.load(Ordering::SeqCst);
        let urls = self.repositories();

        let results = fetch_repositories(Arc::clone(&self.host), &urls).await;

        // 世代が進んでいれば、その間に削除されたリポジトリの結果を捨てる
        let configured = (self.generation.load(Ordering::SeqCst) != generation)
            .then(|| self.repositories());

        let mut listings = Vec::new();
        let mut failures = Vec::new();
        for (url, result) in results {
            if configured.as_ref().is_some_and(|c| !c.contains(&url)) {
                tracing::debug!(repository = %url, "Discarding result for removed repository");
                continue;
            }
            match result {
                Ok(entries) => {
                    let listing = RepositoryListing::new(url, entries);
                    if let Err(e) = self.cache.store(&RepositoryCache::from_listing(&listing)) {
                        tracing::warn!(
                            repository = %listing.repository,
                            "Failed to cache repository: {}",
                            e
                        );
                    }
                    listings.push(listing);
                }
                Err(e) => {
                    tracing::warn!(repository = %url, "Failed to fetch repository: {}", e);
                    match self.cache.get(&url) {
                        Ok(Some(cached)) => listings.push(cached.into_listing()),
                        Ok(None) => {}
                        Err(cache_err) => tracing::warn!(
                            repository = %url,
                            "Ignoring unreadable repository cache: {}",
                            cache_err
                        ),
                    }
                    failures.push((url, e));
                }
            }
        }

        Ok(CatalogRefresh {
            extensions: self.registry.reconcile(&listings),
            failures,
        })
    }

    /// キャッシュ済みのリポジトリ情報からカタログを作る（ネットワーク不要）
    pub fn cached_catalog(&self) -> Result<Vec<MoonbaseExtension>> {
        let listings = self.cache.listings(&self.repositories())?;
        Ok(self.registry.reconcile(&listings))
    }

    /// カタログから拡張機能を探す
    pub fn find(&self, id: &str) -> Result<MoonbaseExtension> {
        self.cached_catalog()?
            .into_iter()
            .find(|ext| ext.id == id)
            .ok_or_else(|| MoonbaseError::ExtensionNotFound(id.to_string()))
    }

    // ==================== ライフサイクル ====================

    /// カタログ上の拡張機能をインストールする（無効状態で入る）
    pub async fn install(&self, id: &str) -> Result<MoonbaseExtension> {
        let ext = self.find(id)?;
        if ext.state.is_installed() {
            return Err(MoonbaseError::invalid_state(id, ext.state, "install"));
        }
        let (download, repository) = match (ext.download, ext.source) {
            (Some(download), ExtensionSource::Repository(repository)) => (download, repository),
            _ => return Err(MoonbaseError::ExtensionNotFound(id.to_string())),
        };
        let manifest = RepositoryManifest {
            manifest: ext.manifest,
            download,
        };

        // 以前の有効フラグが残っていても次回起動時に無効で始まるようにする
        let was_enabled = self.clear_enabled_flag(id)?;
        match self
            .registry
            .install(self.host.as_ref(), &manifest, &repository)
            .await
        {
            Ok(installed) => Ok(installed),
            Err(e) => {
                self.restore_enabled_flag(id, was_enabled);
                Err(e)
            }
        }
    }

    /// 拡張機能を削除する
    ///
    /// ユーザーの設定値は残し、有効フラグだけ下ろす。
    pub async fn uninstall(&self, id: &str) -> Result<()> {
        let was_enabled = self.clear_enabled_flag(id)?;
        if let Err(e) = self.registry.delete(self.host.as_ref(), id).await {
            self.restore_enabled_flag(id, was_enabled);
            return Err(e);
        }
        Ok(())
    }

    /// 有効フラグを下ろして保存し、下ろしたかどうかを返す
    ///
    /// ホスト操作より先に保存するので、保存に失敗しても何も変わらない。
    fn clear_enabled_flag(&self, id: &str) -> Result<bool> {
        self.update_config(|config| {
            let was_enabled = config.is_enabled(id);
            if was_enabled {
                config.set_enabled(id, false);
            }
            Ok(was_enabled)
        })
    }

    /// ホスト操作が失敗したときに有効フラグを戻す
    fn restore_enabled_flag(&self, id: &str, was_enabled: bool) {
        if !was_enabled {
            return;
        }
        if let Err(e) = self.update_config(|config| {
            config.set_enabled(id, true);
            Ok(())
        }) {
            tracing::warn!(extension = id, "Failed to restore enabled flag: {}", e);
        }
    }

    /// 有効/無効を切り替えて設定に保存する
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<ExtensionState> {
        let previous = self.registry.state_of(id);
        let state = self.registry.set_enabled(id, enabled).await?;

        if let Err(e) = self.update_config(|config| {
            config.set_enabled(id, enabled);
            Ok(())
        }) {
            self.registry
                .set_enabled(id, previous == ExtensionState::Enabled)
                .await?;
            return Err(e);
        }
        Ok(state)
    }

    // ==================== 設定 ====================

    /// 設定スキーマ（インストール済みならそのマニフェスト、無ければカタログ）
    fn schema(&self, id: &str) -> Result<SettingsSchema> {
        match self.registry.get(id) {
            Some(installed) => Ok(installed.manifest.settings),
            None => Ok(self.find(id)?.manifest.settings),
        }
    }

    /// 実効設定
    pub fn effective_config(&self, id: &str) -> Result<EffectiveConfig> {
        let schema = self.schema(id)?;
        Ok(effective_config(id, self.config_file().config(), &schema))
    }

    /// 設定値を上書きして保存し、新しい実効設定を返す
    pub fn set_setting(&self, id: &str, key: &str, value: Value) -> Result<EffectiveConfig> {
        let schema = self.schema(id)?;
        if !schema.contains_key(key) {
            tracing::warn!(extension = id, "Setting '{}' is not declared by the extension", key);
        }
        self.update_config(|config| {
            config.set_setting(id, key, value);
            Ok(())
        })?;
        Ok(effective_config(id, self.config_file().config(), &schema))
    }

    /// 上書き値を削除して保存する
    pub fn unset_setting(&self, id: &str, key: &str) -> Result<Option<Value>> {
        self.update_config(|config| Ok(config.remove_setting(id, key)))
    }

    /// ホストが保持する生の設定値
    pub fn get_extension_config(&self, id: &str, key: &str) -> Option<Value> {
        self.host.get_extension_config(id, key)
    }

    // ==================== リポジトリ ====================

    pub fn add_repository(&self, url: &str) -> Result<()> {
        self.update_config(|config| config.add_repository(url))?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!(repository = url, "Repository added");
        Ok(())
    }

    pub fn remove_repository(&self, url: &str) -> Result<()> {
        self.update_config(|config| config.remove_repository(url))?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.cache.remove(url) {
            tracing::warn!(repository = url, "Failed to remove repository cache: {}", e);
        }
        tracing::info!(repository = url, "Repository removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "application_test.rs"]
mod tests;
