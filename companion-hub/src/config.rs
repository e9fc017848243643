//! Server configuration.
//!
//! Defaults match the desktop app: listen on `127.0.0.1:8000`, keep the
//! document in `db.json` beside this crate and serve the bundled UI from the
//! crate directory. Each value can be overridden through the environment.

use anyhow::{Context, Result};
use companion_hub_core::ExportDir;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;

const ADDR_VAR: &str = "COMPANION_HUB_ADDR";
const DATA_FILE_VAR: &str = "COMPANION_HUB_DATA_FILE";
const ASSETS_DIR_VAR: &str = "COMPANION_HUB_ASSETS_DIR";
const DOWNLOADS_DIR_VAR: &str = "COMPANION_HUB_DOWNLOADS_DIR";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// JSON file holding the document.
    pub data_file: PathBuf,
    /// Root containing `frontend/` and `favicon.ico`.
    pub assets_dir: PathBuf,
    /// Target of `/save-file`. `None` when no downloads directory exists.
    pub downloads_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_file: root.join("db.json"),
            assets_dir: root,
            downloads_dir: ExportDir::downloads().map(|exports| exports.dir().to_path_buf()),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `COMPANION_HUB_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ADDR_VAR) {
            config.addr = addr
                .parse()
                .with_context(|| format!("invalid {ADDR_VAR} `{addr}`"))?;
        }
        if let Some(path) = lookup(DATA_FILE_VAR) {
            config.data_file = path.into();
        }
        if let Some(path) = lookup(ASSETS_DIR_VAR) {
            config.assets_dir = path.into();
        }
        if let Some(path) = lookup(DOWNLOADS_DIR_VAR) {
            config.downloads_dir = Some(path.into());
        }
        Ok(config)
    }

    pub fn exports(&self) -> Option<ExportDir> {
        self.downloads_dir.clone().map(ExportDir::new)
    }
}
