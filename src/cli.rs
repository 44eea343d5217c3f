use clap::{Parser, Subcommand};

use crate::commands::{config, disable, enable, info, install, list, repo, sync, uninstall};

#[derive(Debug, Parser)]
#[command(name = "moonbase")]
#[command(about = "Extension marketplace for moonlight", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage extension repositories
    Repo(repo::Args),

    /// Fetch the catalog from every repository
    #[command(long_about = "Fetch every configured repository concurrently and refresh the \
local catalog cache. Repositories that fail to fetch fall back to their last cached listing.")]
    Sync(sync::Args),

    /// List extensions
    #[command(long_about = "List extensions from the cached catalog together with installed \
extensions.

STATES:
  not-downloaded  Available in a repository but not installed
  disabled        Installed but not loaded
  enabled         Installed and loaded")]
    List(list::Args),

    /// Show extension details
    #[command(long_about = "Show manifest details, install location and effective settings of \
an extension.")]
    Info(info::Args),

    /// Install an extension from the catalog
    #[command(long_about = "Download and install an extension listed in the catalog. \
Installed extensions start disabled; pass --enable or run 'moonbase enable <id>'.")]
    Install(install::Args),

    /// Uninstall an extension
    Uninstall(uninstall::Args),

    /// Enable an installed extension
    Enable(enable::Args),

    /// Disable an installed extension
    Disable(disable::Args),

    /// Show or change extension settings
    #[command(long_about = "Show the effective settings of an extension. Values are validated \
against the extension's settings schema: invalid values fall back to defaults and numbers are \
clamped to their range.

EXAMPLES:
  moonbase config sample
  moonbase config sample --set volume=50 --set theme=dark
  moonbase config sample --unset volume")]
    Config(config::Args),
}
