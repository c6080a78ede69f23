use std::path::PathBuf;

use clap::Parser;

use reliability_sim::lifecycle::{bind, init_proxy, shutdown_signal, Shutdown};
use reliability_sim::ProxyServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ui-proxy")]
#[command(about = "Serves the UI and proxies /api/* to the reliability-sim backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The backend owns the JSON log file; the proxy only logs to the console.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reliability_sim=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let (config, index) = init_proxy(cli.config.as_deref())?;

    let listener = bind(&config.proxy.bind_address).await?;
    tracing::info!(
        index = %index.display(),
        api_prefix = %config.proxy.api_prefix,
        "Serving UI"
    );

    let server = ProxyServer::new(&config);
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutting down.");
    Ok(())
}
