//! ログ出力の初期化

use crate::env::EnvVar;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 既定のログレベル
pub const DEFAULT_LEVEL: &str = "warn";

/// フィルタ指定を決める
///
/// `RUST_LOG` > 設定ファイルの `loggerLevel` > `warn` の順に優先する。
pub fn filter_directive(rust_log: Option<&str>, logger_level: Option<&str>) -> String {
    [rust_log, logger_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// tracing subscriber を初期化する（出力先は stderr）
pub fn init(logger_level: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rust_log = EnvVar::get("RUST_LOG");
    let directive = filter_directive(rust_log.as_deref(), logger_level);
    let filter_layer =
        EnvFilter::try_new(&directive).or_else(|_| EnvFilter::try_new(DEFAULT_LEVEL))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins() {
        assert_eq!(filter_directive(Some("debug"), Some("info")), "debug");
    }

    #[test]
    fn test_logger_level_from_config() {
        assert_eq!(filter_directive(None, Some("info")), "info");
    }

    #[test]
    fn test_default_level() {
        assert_eq!(filter_directive(None, None), "warn");
    }

    #[test]
    fn test_blank_values_fall_through() {
        assert_eq!(filter_directive(Some(""), None), "warn");
        assert_eq!(filter_directive(None, Some("  ")), "warn");
        assert_eq!(filter_directive(Some(" "), Some("info")), "info");
    }

    #[test]
    fn test_init_twice_is_error() {
        // 1プロセスで1回しか初期化できない
        let _ = init(Some("error"));
        assert!(init(Some("error")).is_err());
    }
}
