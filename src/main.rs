mod cli;
mod commands;

use clap::Parser;
use moonbase::config::ConfigFile;
use moonbase::env::MoonbasePaths;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let logger_level = MoonbasePaths::from_home()
        .and_then(|paths| ConfigFile::load_from(paths.config_file()))
        .ok()
        .and_then(|file| file.config().logger_level.clone());
    if let Err(err) = moonbase::logging::init(logger_level.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
    }

    if let Err(err) = commands::dispatch(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
