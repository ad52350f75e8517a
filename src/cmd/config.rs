use anyhow::Result;
use clap::Args;

use huddle::config::CommonConfig;
use huddle::server::config::ServerConfig;

use super::ConfigArgs;

/// Display the completed server configuration in JSON format.
#[derive(Args)]
pub struct ShowConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl ShowConfigArgs {
    pub fn run(&self) -> Result<()> {
        let ps = self.config.build_path_set()?;
        let cfg: ServerConfig = ps.load_config("server", ServerConfig::default)?;
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        Ok(())
    }
}
