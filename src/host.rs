//! ホスト機能の抽象化
//!
//! リポジトリ取得・インストール・削除・設定値の参照はホスト側の機能として
//! trait 経由で注入する。本番では [`LocalHost`]、テストではモックを使う。

pub mod local;
mod meta;

#[cfg(test)]
pub mod mock;

pub use local::LocalHost;
pub use meta::InstallMeta;

use crate::catalog::ExtensionSource;
use crate::error::Result;
use crate::http::with_retry;
use crate::manifest::{ExtensionManifest, RepositoryManifest};
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

/// ディスク上で見つかった拡張機能
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedExtension {
    pub manifest: ExtensionManifest,
    pub source: ExtensionSource,
    /// インストール先
    pub location: PathBuf,
}

/// ホスト機能 trait
pub trait MoonbaseHost: Send + Sync {
    /// リポジトリのマニフェスト一覧（未検証のJSON）を取得
    fn fetch_repository<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>>> + Send + 'a>>;

    /// 拡張機能をダウンロードしてインストールし、インストール先を返す
    fn install_extension<'a>(
        &'a self,
        manifest: &'a RepositoryManifest,
        url: &'a str,
        repository: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PathBuf>> + Send + 'a>>;

    /// 拡張機能を削除
    fn delete_extension<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// インストール済みの拡張機能を列挙
    fn detect_extensions<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DetectedExtension>>> + Send + 'a>>;

    /// 保存済みの設定値をそのまま返す（スキーマ検証は行わない）
    fn get_extension_config(&self, id: &str, key: &str) -> Option<Value>;
}

/// リポジトリ取得の再試行回数
const FETCH_RETRIES: u32 = 2;

/// 複数リポジトリを並行して取得する
///
/// 結果は完了順ではなく `urls` の順に並べて返す。一時的なエラーは再試行する。
pub async fn fetch_repositories(
    host: Arc<dyn MoonbaseHost>,
    urls: &[String],
) -> Vec<(String, Result<Vec<Value>>)> {
    let mut set = JoinSet::new();
    for (idx, url) in urls.iter().enumerate() {
        let host = Arc::clone(&host);
        let url = url.clone();
        set.spawn(async move {
            let result = with_retry(|| host.fetch_repository(&url), FETCH_RETRIES).await;
            (idx, result)
        });
    }

    let mut slots: Vec<Option<Result<Vec<Value>>>> = urls.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(e) => tracing::error!("Repository fetch task failed: {}", e),
        }
    }

    urls.iter()
        .cloned()
        .zip(slots)
        .filter_map(|(url, slot)| slot.map(|result| (url, result)))
        .collect()
}
