use super::open_moonbase;
use clap::Parser;
use owo_colors::OwoColorize;

#[derive(Debug, Parser)]
pub struct Args {
    /// 拡張機能ID
    pub id: String,

    /// インストール後に有効化する
    #[arg(long)]
    pub enable: bool,
}

pub async fn run(args: Args) -> Result<(), String> {
    let app = open_moonbase().await?;

    println!("Installing '{}'...", args.id);
    let installed = app.install(&args.id).await.map_err(|e| e.to_string())?;
    println!(
        "{} Installed {} {} from {}",
        "✓".green(),
        installed.manifest.display_name().bold(),
        installed.manifest.version.as_deref().unwrap_or(""),
        installed.source
    );

    if args.enable {
        app.set_enabled(&args.id, true)
            .await
            .map_err(|e| e.to_string())?;
        println!("{} Enabled '{}'.", "✓".green(), args.id);
    } else {
        println!("Run 'moonbase enable {}' to enable it.", args.id);
    }
    Ok(())
}
