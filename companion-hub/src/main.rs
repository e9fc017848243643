use anyhow::Result;
use clap::Parser;
use companion_hub::{telemetry, ServerConfig, ServerHandle};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "companion-hub")]
#[command(about = "Serve the companion document API and UI without the desktop window")]
struct Cli {
    /// Listen address
    #[arg(short, long)]
    addr: Option<SocketAddr>,

    /// JSON file holding the document
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Directory containing `frontend/` and `favicon.ico`
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Directory that `/save-file` writes into
    #[arg(long)]
    downloads_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(addr) = self.addr {
            config.addr = addr;
        }
        if let Some(path) = self.data_file {
            config.data_file = path;
        }
        if let Some(path) = self.assets_dir {
            config.assets_dir = path;
        }
        if let Some(path) = self.downloads_dir {
            config.downloads_dir = Some(path);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    cli.apply(&mut config);

    let server = ServerHandle::start(&config).await?;
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    server.stop().await
}
