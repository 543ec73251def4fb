use clap::Parser;
use tracing_subscriber::EnvFilter;

use invoice_api::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "invoice-api", version, about = "Invoice API server")]
struct Args {
    /// Listen port, overriding PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_CONNECTION, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invoice_api=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    invoice_api::server::run(config).await
}
