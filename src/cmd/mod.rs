mod config;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use huddle::config::PathSet;
use huddle::logs;

#[derive(Parser)]
#[command(author, version = env!("HUDDLE_VERSION"), about)]
pub struct App {
    #[command(subcommand)]
    pub commands: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Serve(serve::ServeArgs),
    Config(config::ShowConfigArgs),
}

impl App {
    pub async fn run(&self) -> Result<()> {
        match &self.commands {
            Commands::Serve(args) => args.run().await,
            Commands::Config(args) => args.run(),
        }
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Directory holding `server.toml` and the pki files.
    /// Default: $HUDDLE_CONFIG or ~/.config/huddle
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Directory holding the database file.
    /// Default: $HUDDLE_DATA or ~/.local/share/huddle
    #[arg(long)]
    pub data_path: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        PathSet::new(self.config_path.clone(), self.data_path.clone())
    }
}

#[derive(Args)]
pub struct LogArgs {
    /// The log level, one of error, warn, info and debug.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl LogArgs {
    pub fn init(&self) -> Result<()> {
        logs::init(&self.log_level)
    }
}
