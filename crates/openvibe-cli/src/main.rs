use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use openvibe_infrastructure::OpenVibePaths;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "openvibe")]
#[command(about = "OpenVibe CLI - inspect persisted tabs, detached tab URLs and configuration", long_about = None)]
struct Cli {
    /// Root all config/data paths here instead of the platform directories
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persisted tab bar
    Tabs {
        #[command(subcommand)]
        action: TabsAction,
    },
    /// Detached tab window URLs
    Detached {
        #[command(subcommand)]
        action: DetachedAction,
    },
    /// Effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum TabsAction {
    /// Print persisted tabs and the active tab id
    List,
    /// Remove the persisted tab list and active tab id
    Clear,
}

#[derive(Subcommand)]
enum DetachedAction {
    /// Decode the tab payload carried by a detached window URL
    Decode { url: String },
    /// Attach a tab payload to a URL
    Encode {
        #[arg(long)]
        url: String,
        #[arg(long)]
        id: String,
        /// thread | workspace | home
        #[arg(long)]
        kind: String,
        #[arg(long)]
        workspace_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        thread_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration as TOML
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = OpenVibePaths::new(cli.base_dir);
    let _log_guard = logging::init(&paths);

    let output = match cli.command {
        Commands::Tabs { action } => match action {
            TabsAction::List => commands::tabs::list(&paths).await?,
            TabsAction::Clear => commands::tabs::clear(&paths).await?,
        },
        Commands::Detached { action } => match action {
            DetachedAction::Decode { url } => commands::detached::decode(&url)?,
            DetachedAction::Encode {
                url,
                id,
                kind,
                workspace_id,
                title,
                thread_id,
            } => commands::detached::encode(&url, id, &kind, workspace_id, title, thread_id)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&paths)?,
        },
    };

    println!("{}", output);
    Ok(())
}
