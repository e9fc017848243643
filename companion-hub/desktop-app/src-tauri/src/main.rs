//! Desktop shell: runs the document server in the background and shows the
//! bundled UI in a native window until the window is closed.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use companion_hub::{telemetry, ServerConfig, ServerHandle};
use std::path::Path;
use std::sync::OnceLock;
use tauri::{RunEvent, WebviewUrl, WebviewWindowBuilder};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const WINDOW_TITLE: &str = "DigitalWife";
const WINDOW_WIDTH: f64 = 1200.0;
const WINDOW_HEIGHT: f64 = 800.0;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn main() {
    if let Err(error) = run() {
        tracing::error!(error = %error, "desktop shell failed");
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = ServerConfig::from_env()?;
    let log_dir = match config.data_file.parent() {
        Some(parent) => parent.join("logs"),
        None => Path::new("logs").to_path_buf(),
    };
    init_tracing(&log_dir)?;

    let server = tauri::async_runtime::block_on(ServerHandle::start(&config))?;
    let url: tauri::Url = server
        .url()
        .parse()
        .with_context(|| format!("invalid server url {}", server.url()))?;
    let mut server = Some(server);

    let app = tauri::Builder::default()
        .setup(move |app| {
            WebviewWindowBuilder::new(app, "main", WebviewUrl::External(url))
                .title(WINDOW_TITLE)
                .inner_size(WINDOW_WIDTH, WINDOW_HEIGHT)
                .resizable(true)
                .build()?;
            Ok(())
        })
        .build(tauri::generate_context!())
        .context("failed to build desktop shell")?;

    app.run(move |_handle, event| {
        if let RunEvent::Exit = event {
            if let Some(server) = server.take() {
                if let Err(error) = tauri::async_runtime::block_on(server.stop()) {
                    tracing::warn!(error = %error, "server did not stop cleanly");
                }
            }
        }
    });
    Ok(())
}

/// Log to stdout and to a daily JSON file under `log_dir`.
fn init_tracing(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "companion-hub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::registry()
        .with(telemetry::env_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        .try_init()?;
    Ok(())
}
