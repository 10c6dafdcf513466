//! Notes Server - HTTP REST API for notes
//!
//! Reads `.env` if present, loads configuration and serves until shutdown.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
