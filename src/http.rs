//! 共通HTTPヘルパー

use crate::error::{MoonbaseError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;

/// 最初の再試行までの待ち時間（以降は倍々）
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// ステータスを確認し、失敗なら RepositoryApi エラーにする
async fn ensure_success(url: &str, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Err(MoonbaseError::RepositoryApi {
        url: url.to_string(),
        status,
        message,
    })
}

/// JSON を取得
pub async fn get_json(client: &Client, url: &str) -> Result<serde_json::Value> {
    let response = client.get(url).send().await?;
    let response = ensure_success(url, response).await?;
    Ok(response.json().await?)
}

/// プログレスバー付きダウンロード
pub async fn download_with_progress(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?;
    let response = ensure_success(url, response).await?;

    let total_size = response.content_length().unwrap_or(0);

    let pb = if total_size > 0 {
        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} Downloading...")
        {
            pb.set_style(style);
        }
        pb
    };

    let bytes = response.bytes().await?;
    pb.finish_and_clear();

    Ok(bytes.to_vec())
}

/// 一時的なエラー（ネットワーク / 5xx）のときだけ再試行する
///
/// `max_retries` は初回を含まない再試行回数。
pub async fn with_retry<T, F, Fut>(mut op: F, max_retries: u32) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                tracing::debug!(attempt, "Retrying after error: {}", e);
                tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1)).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
