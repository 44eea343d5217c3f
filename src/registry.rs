//! 拡張機能レジストリ
//!
//! インストール済み拡張機能の状態と uniqueId を保持し、状態遷移を強制する。
//!
//! ```text
//! NotDownloaded --install--> Disabled <--set_enabled--> Enabled
//!                            Disabled | Enabled --delete--> (登録解除)
//! ```
//!
//! 同じIDへの操作は ID ごとの非同期ロックで直列化する。内部のマップは
//! std の Mutex で保護し、`.await` をまたいで保持しない。

use crate::catalog::{
    self, ExtensionSource, ExtensionState, MoonbaseExtension, RepositoryListing, UniqueIds,
};
use crate::config::Config;
use crate::error::{MoonbaseError, Result};
use crate::host::{DetectedExtension, MoonbaseHost};
use crate::manifest::{ExtensionManifest, RepositoryManifest};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// レジストリに登録された拡張機能
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledExtension {
    pub manifest: ExtensionManifest,
    pub unique_id: u64,
    pub source: ExtensionSource,
    /// Disabled または Enabled
    pub state: ExtensionState,
    pub location: PathBuf,
}

impl InstalledExtension {
    /// カタログ表現に変換
    pub fn to_extension(&self) -> MoonbaseExtension {
        MoonbaseExtension {
            id: self.manifest.id.clone(),
            unique_id: self.unique_id,
            manifest: self.manifest.clone(),
            download: None,
            source: self.source.clone(),
            state: self.state,
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    installed: BTreeMap<String, InstalledExtension>,
    ids: UniqueIds,
}

/// 拡張機能レジストリ
#[derive(Default)]
pub struct ExtensionRegistry {
    inner: Mutex<RegistryInner>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// IDごとのロックを取得
    async fn lock_id(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// 誰も保持・待機していなければIDのロックを捨てる
    fn prune_lock(&self, id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }

    /// ディスク上で検出した拡張機能を登録する
    ///
    /// 状態は永続化された `enabled` フラグで決まる。同じIDが複数検出された
    /// 場合は先に見つかったものを使う。
    pub fn seed(&self, detected: Vec<DetectedExtension>, config: &Config) {
        let mut inner = self.inner();
        for found in detected {
            let id = found.manifest.id.clone();
            if let Some(existing) = inner.installed.get(&id) {
                tracing::warn!(
                    extension = %id,
                    "Ignoring {} (already loaded from {})",
                    found.location.display(),
                    existing.location.display()
                );
                continue;
            }
            let unique_id = inner.ids.observe(&id);
            let state = ExtensionState::from_enabled(config.is_enabled(&id));
            tracing::debug!(extension = %id, unique_id, %state, "Registered extension");
            inner.installed.insert(
                id,
                InstalledExtension {
                    manifest: found.manifest,
                    unique_id,
                    source: found.source,
                    state,
                    location: found.location,
                },
            );
        }
    }

    /// 現在の状態（未登録なら NotDownloaded）
    pub fn state_of(&self, id: &str) -> ExtensionState {
        self.inner()
            .installed
            .get(id)
            .map(|ext| ext.state)
            .unwrap_or(ExtensionState::NotDownloaded)
    }

    pub fn get(&self, id: &str) -> Option<InstalledExtension> {
        self.inner().installed.get(id).cloned()
    }

    /// 登録済みの拡張機能（uniqueId 順）
    pub fn snapshot(&self) -> Vec<MoonbaseExtension> {
        let mut extensions: Vec<MoonbaseExtension> = self
            .inner()
            .installed
            .values()
            .map(InstalledExtension::to_extension)
            .collect();
        extensions.sort_by_key(|ext| ext.unique_id);
        extensions
    }

    /// リポジトリの取得結果と突き合わせたカタログを作る
    pub fn reconcile(&self, listings: &[RepositoryListing]) -> Vec<MoonbaseExtension> {
        let installed = self.snapshot();
        let mut inner = self.inner();
        catalog::reconcile(listings, &installed, &mut inner.ids)
    }

    /// インストール: NotDownloaded → Disabled
    ///
    /// ホスト側で失敗した場合はレジストリを変更しない。
    pub async fn install(
        &self,
        host: &dyn MoonbaseHost,
        manifest: &RepositoryManifest,
        repository: &str,
    ) -> Result<MoonbaseExtension> {
        let id = manifest.id();
        let _guard = self.lock_id(id).await;

        let state = self.state_of(id);
        if state.is_installed() {
            return Err(MoonbaseError::invalid_state(id, state, "install"));
        }

        let location = host
            .install_extension(manifest, &manifest.download, repository)
            .await
            .map_err(|e| match e {
                MoonbaseError::Install { .. } => e,
                other => MoonbaseError::Install {
                    id: id.to_string(),
                    reason: other.to_string(),
                },
            })?;

        let mut inner = self.inner();
        let unique_id = inner.ids.observe(id);
        let installed = InstalledExtension {
            manifest: manifest.manifest.clone(),
            unique_id,
            source: ExtensionSource::Repository(repository.to_string()),
            state: ExtensionState::Disabled,
            location,
        };
        let mut extension = installed.to_extension();
        extension.download = Some(manifest.download.clone());
        inner.installed.insert(id.to_string(), installed);

        tracing::info!(extension = id, unique_id, "Extension installed");
        Ok(extension)
    }

    /// 削除: Disabled | Enabled → 登録解除
    ///
    /// uniqueId の割り当ては残るため、再インストール時も同じ番号になる。
    pub async fn delete(&self, host: &dyn MoonbaseHost, id: &str) -> Result<InstalledExtension> {
        let guard = self.lock_id(id).await;
        let result = self.delete_locked(host, id).await;
        drop(guard);
        self.prune_lock(id);
        result
    }

    async fn delete_locked(&self, host: &dyn MoonbaseHost, id: &str) -> Result<InstalledExtension> {
        let state = self.state_of(id);
        if !state.is_installed() {
            return Err(MoonbaseError::invalid_state(id, state, "delete"));
        }

        host.delete_extension(id).await?;

        let removed = self
            .inner()
            .installed
            .remove(id)
            .ok_or_else(|| MoonbaseError::ExtensionNotFound(id.to_string()))?;
        tracing::info!(extension = id, "Extension deleted");
        Ok(removed)
    }

    /// 有効/無効の切り替え: Disabled ↔ Enabled
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<ExtensionState> {
        let _guard = self.lock_id(id).await;

        let mut inner = self.inner();
        let ext = inner.installed.get_mut(id).ok_or_else(|| {
            MoonbaseError::invalid_state(
                id,
                ExtensionState::NotDownloaded,
                if enabled { "enable" } else { "disable" },
            )
        })?;
        ext.state = ExtensionState::from_enabled(enabled);
        tracing::debug!(extension = id, state = %ext.state, "Extension state changed");
        Ok(ext.state)
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
