//! combot CLI: run the moderation bot or check its persisted inputs. Config from env and
//! optional CLI args.

use anyhow::Result;
use clap::Parser;
use combot_cli::{check, run, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run(token).await,
        Commands::Check => check(),
    }
}
