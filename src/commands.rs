use crate::cli::Command;
use moonbase::application::Moonbase;
use moonbase::config::HttpConfig;
use moonbase::env::MoonbasePaths;
use moonbase::host::LocalHost;
use std::sync::Arc;

pub mod config;
pub mod disable;
pub mod enable;
pub mod info;
pub mod install;
pub mod list;
pub mod repo;
pub mod sync;
pub mod uninstall;

pub async fn dispatch(cli: crate::cli::Cli) -> Result<(), String> {
    match cli.command {
        Command::Repo(args) => repo::run(args).await,
        Command::Sync(args) => sync::run(args).await,
        Command::List(args) => list::run(args).await,
        Command::Info(args) => info::run(args).await,
        Command::Install(args) => install::run(args).await,
        Command::Uninstall(args) => uninstall::run(args).await,
        Command::Enable(args) => enable::run(args).await,
        Command::Disable(args) => disable::run(args).await,
        Command::Config(args) => config::run(args).await,
    }
}

/// `~/.moonbase` を基点にサービスを開く
pub(crate) async fn open_moonbase() -> Result<Moonbase, String> {
    let paths = MoonbasePaths::from_home().map_err(|e| e.to_string())?;
    let host = LocalHost::new(paths.clone(), &HttpConfig::default());
    Moonbase::open(Arc::new(host), &paths)
        .await
        .map_err(|e| e.to_string())
}
