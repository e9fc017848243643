pub mod api;
pub mod config;
pub mod server;
pub mod telemetry;

pub use config::ServerConfig;
pub use server::ServerHandle;
