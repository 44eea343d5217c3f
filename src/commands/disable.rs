use super::open_moonbase;
use clap::Parser;
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {
    /// 拡張機能ID
    pub id: String,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;
    let state = app
        .set_enabled(&args.id, false)
        .await
        .map_err(|e| e.to_string())?;

    println!("{} '{}' is now {}.", "✓".green(), args.id, state);
    Ok(())
}
