//! Lifecycle of the HTTP listener.
//!
//! [`ServerHandle::start`] binds and spawns the server on the current tokio
//! runtime and hands back the only means of stopping it.

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use companion_hub_core::DocumentFile;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub async fn start(config: &ServerConfig) -> Result<Self> {
        let state = AppState {
            documents: DocumentFile::new(&config.data_file),
            exports: config.exports(),
        };
        let app = api::router(state, &config.assets_dir);

        let listener = TcpListener::bind(config.addr)
            .await
            .with_context(|| format!("failed to bind {}", config.addr))?;
        let addr = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(async {
                    // a dropped sender also means stop
                    let _ = signal.await;
                })
                .await
        });

        info!(
            %addr,
            data_file = %config.data_file.display(),
            assets_dir = %config.assets_dir.display(),
            "listening"
        );
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Stop accepting connections, let in-flight requests finish and wait
    /// for the server task to exit.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.task.await.context("server task panicked")??;
        info!(addr = %self.addr, "server stopped");
        Ok(())
    }
}
