//! テスト用モックホスト

use super::*;
use crate::error::MoonbaseError;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

/// テスト用モックホスト
pub struct MockHost {
    repositories: RwLock<HashMap<String, Vec<Value>>>,
    fetch_delays: RwLock<HashMap<String, u64>>,
    fetch_failures: RwLock<HashMap<String, (u16, u32)>>,
    fetch_counts: RwLock<HashMap<String, u32>>,
    installed: RwLock<Vec<DetectedExtension>>,
    failing_installs: RwLock<HashSet<String>>,
    config: RwLock<HashMap<(String, String), Value>>,
    install_delay_ms: RwLock<u64>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            repositories: RwLock::new(HashMap::new()),
            fetch_delays: RwLock::new(HashMap::new()),
            fetch_failures: RwLock::new(HashMap::new()),
            fetch_counts: RwLock::new(HashMap::new()),
            installed: RwLock::new(Vec::new()),
            failing_installs: RwLock::new(HashSet::new()),
            config: RwLock::new(HashMap::new()),
            install_delay_ms: RwLock::new(0),
        }
    }

    /// リポジトリの内容を登録
    pub fn add_repository(&self, url: &str, entries: Vec<Value>) {
        self.repositories
            .write()
            .unwrap()
            .insert(url.to_string(), entries);
    }

    /// 取得に遅延を入れる（ミリ秒）
    pub fn set_fetch_delay(&self, url: &str, millis: u64) {
        self.fetch_delays
            .write()
            .unwrap()
            .insert(url.to_string(), millis);
    }

    /// 次の `times` 回の取得を指定ステータスで失敗させる
    pub fn fail_fetches(&self, url: &str, status: u16, times: u32) {
        self.fetch_failures
            .write()
            .unwrap()
            .insert(url.to_string(), (status, times));
    }

    /// 取得が呼ばれた回数
    pub fn fetch_count(&self, url: &str) -> u32 {
        self.fetch_counts
            .read()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// インストールに遅延を入れる（ミリ秒）
    pub fn set_install_delay(&self, millis: u64) {
        *self.install_delay_ms.write().unwrap() = millis;
    }

    /// インストール済みの拡張機能を追加
    pub fn add_installed(&self, manifest: ExtensionManifest, source: ExtensionSource) {
        let location = PathBuf::from("/mock/extensions").join(&manifest.id);
        self.installed.write().unwrap().push(DetectedExtension {
            manifest,
            source,
            location,
        });
    }

    /// 指定IDのインストールを失敗させる
    pub fn fail_install(&self, id: &str) {
        self.failing_installs
            .write()
            .unwrap()
            .insert(id.to_string());
    }

    /// 設定値を登録
    pub fn set_config(&self, id: &str, key: &str, value: Value) {
        self.config
            .write()
            .unwrap()
            .insert((id.to_string(), key.to_string()), value);
    }

    /// インストール済みIDの一覧
    pub fn installed_ids(&self) -> Vec<String> {
        self.installed
            .read()
            .unwrap()
            .iter()
            .map(|e| e.manifest.id.clone())
            .collect()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MoonbaseHost for MockHost {
    fn fetch_repository<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>>> + Send + 'a>> {
        Box::pin(async move {
            *self
                .fetch_counts
                .write()
                .unwrap()
                .entry(url.to_string())
                .or_default() += 1;
            let delay = self.fetch_delays.read().unwrap().get(url).copied();
            if let Some(millis) = delay {
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            if let Some((status, remaining)) =
                self.fetch_failures.write().unwrap().get_mut(url)
            {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(MoonbaseError::RepositoryApi {
                        url: url.to_string(),
                        status: *status,
                        message: "injected failure".to_string(),
                    });
                }
            }
            self.repositories
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| MoonbaseError::RepositoryApi {
                    url: url.to_string(),
                    status: 404,
                    message: "not found".to_string(),
                })
        })
    }

    fn install_extension<'a>(
        &'a self,
        manifest: &'a RepositoryManifest,
        _url: &'a str,
        repository: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf>> + Send + 'a>> {
        Box::pin(async move {
            let delay = *self.install_delay_ms.read().unwrap();
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.failing_installs.read().unwrap().contains(manifest.id()) {
                return Err(MoonbaseError::Install {
                    id: manifest.id().to_string(),
                    reason: "download failed".to_string(),
                });
            }
            let location = PathBuf::from("/mock/extensions").join(manifest.id());
            self.installed.write().unwrap().push(DetectedExtension {
                manifest: manifest.manifest.clone(),
                source: ExtensionSource::Repository(repository.to_string()),
                location: location.clone(),
            });
            Ok(location)
        })
    }

    fn delete_extension<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut installed = self.installed.write().unwrap();
            let before = installed.len();
            installed.retain(|e| e.manifest.id != id);
            if installed.len() == before {
                return Err(MoonbaseError::ExtensionNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn detect_extensions<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DetectedExtension>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.installed.read().unwrap().clone()) })
    }

    fn get_extension_config(&self, id: &str, key: &str) -> Option<Value> {
        self.config
            .read()
            .unwrap()
            .get(&(id.to_string(), key.to_string()))
            .cloned()
    }
}
