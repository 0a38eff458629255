use orsolve::{start_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Address and solver settings come from ORSOLVE_* variables
    let config = ServerConfig::from_env()?;

    start_server(config).await?;

    Ok(())
}
