use super::{ExtensionSource, ExtensionState, MoonbaseExtension, RepositoryListing, UniqueIds};
use crate::manifest::RepositoryManifest;
use std::collections::{HashMap, HashSet};

/// リポジトリの取得結果とインストール済み拡張機能を突き合わせる
///
/// - 同じIDが複数のリポジトリにある場合は先に宣言されたリポジトリを優先
/// - インストール済みのものは状態と uniqueId を引き継ぎ、マニフェストだけ差し替える
/// - 未インストールのものは `NotDownloaded` として新しい uniqueId を割り当てる
/// - どのリポジトリにも無いインストール済み拡張機能は末尾にそのまま残す
/// - 並び順はリポジトリの宣言順 → リポジトリ内はID順
///
/// 不正なマニフェストはそのエントリだけ読み飛ばす。
pub fn reconcile(
    listings: &[RepositoryListing],
    installed: &[MoonbaseExtension],
    ids: &mut UniqueIds,
) -> Vec<MoonbaseExtension> {
    let mut installed_by_id: HashMap<&str, &MoonbaseExtension> = HashMap::new();
    for ext in installed {
        installed_by_id.entry(ext.id.as_str()).or_insert(ext);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for listing in listings {
        let mut fetched: Vec<RepositoryManifest> = Vec::with_capacity(listing.entries.len());
        for entry in &listing.entries {
            match RepositoryManifest::from_value(entry.clone()) {
                Ok(manifest) => fetched.push(manifest),
                Err(e) => tracing::warn!(
                    repository = %listing.repository,
                    "Skipping malformed manifest: {}",
                    e
                ),
            }
        }

        // 安定ソートなので同一リポジトリ内の重複は先頭が残る
        fetched.sort_by(|a, b| a.id().cmp(b.id()));

        for fetched in fetched {
            if !seen.insert(fetched.id().to_string()) {
                tracing::debug!(
                    repository = %listing.repository,
                    extension = fetched.id(),
                    "Ignoring duplicate extension"
                );
                continue;
            }

            let RepositoryManifest { manifest, download } = fetched;
            let entry = match installed_by_id.get(manifest.id.as_str()) {
                Some(current) => MoonbaseExtension {
                    id: manifest.id.clone(),
                    unique_id: current.unique_id,
                    manifest,
                    download: Some(download),
                    source: current.source.clone(),
                    state: current.state,
                },
                None => MoonbaseExtension {
                    id: manifest.id.clone(),
                    unique_id: ids.observe(&manifest.id),
                    manifest,
                    download: Some(download),
                    source: ExtensionSource::Repository(listing.repository.clone()),
                    state: ExtensionState::NotDownloaded,
                },
            };
            result.push(entry);
        }
    }

    for ext in installed {
        if !seen.contains(&ext.id) {
            result.push(ext.clone());
        }
    }

    result
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
