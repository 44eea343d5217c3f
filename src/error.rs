use crate::catalog::ExtensionState;
use thiserror::Error;

/// Moonbase統一エラー型
#[derive(Debug, Error)]
pub enum MoonbaseError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Repository error: {message} (url: {url}, status: {status})")]
    RepositoryApi {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to install extension '{id}': {reason}")]
    Install { id: String, reason: String },

    #[error("Cannot {action} extension '{id}' while it is {state}")]
    InvalidState {
        id: String,
        state: ExtensionState,
        action: &'static str,
    },

    #[error("Extension not found: {0}")]
    ExtensionNotFound(String),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, MoonbaseError>;

impl MoonbaseError {
    /// リトライ可能なエラーかどうか
    pub fn is_retryable(&self) -> bool {
        match self {
            MoonbaseError::Network(_) => true,
            MoonbaseError::RepositoryApi { status, .. } => {
                // 5xx エラーはリトライ可能
                *status >= 500 && *status < 600
            }
            _ => false,
        }
    }

    /// 状態遷移エラーを生成
    pub fn invalid_state(id: &str, state: ExtensionState, action: &'static str) -> Self {
        MoonbaseError::InvalidState {
            id: id.to_string(),
            state,
            action,
        }
    }
}
