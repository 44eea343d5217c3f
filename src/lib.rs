//! moonbase: moonlight 向け拡張機能マーケットプレイス
//!
//! リポジトリのカタログとインストール済み拡張機能の突き合わせ、設定スキーマの
//! 検証、拡張機能の状態遷移を扱う。

pub mod application;
pub mod catalog;
pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod settings;
