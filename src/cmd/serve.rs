use anyhow::Result;
use clap::Args;

use huddle::config::CommonConfig;
use huddle::server::config::ServerConfig;
use huddle::server::factory::ServerFactory;

use super::{ConfigArgs, LogArgs};

/// Start the huddle server, serving the REST API over HTTP or HTTPS.
#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ServeArgs {
    pub async fn run(&self) -> Result<()> {
        self.log.init()?;
        let ps = self.config.build_path_set()?;
        let cfg: ServerConfig = ps.load_config("server", ServerConfig::default)?;

        let factory = ServerFactory::new(cfg)?;
        let srv = factory.build_server()?;
        srv.run().await
    }
}
