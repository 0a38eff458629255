// Infrastructure: configuration and server lifecycle

pub mod config;

#[cfg(feature = "server")]
pub mod server;

pub use config::{ConfigError, ServerConfig};

#[cfg(feature = "server")]
pub use server::start_server;
