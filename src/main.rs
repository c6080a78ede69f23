use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use reliability_sim::lifecycle::{bind, init_service, shutdown_signal, Shutdown};
use reliability_sim::observability::metrics;
use reliability_sim::simulation::{Branch, FixedOutcome, OutcomeSource, RandomOutcomes};
use reliability_sim::ServiceServer;

#[derive(Parser)]
#[command(name = "reliability-sim")]
#[command(about = "Backend service simulating flaky work behind retries and timeouts", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pin the unstable operation to one branch (success, exception, delay).
    #[arg(long)]
    force_outcome: Option<Branch>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (config, _log_guard) = init_service(cli.config.as_deref())?;

    tracing::info!(
        bind_address = %config.service.bind_address,
        log_file = %config.observability.log_file,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let source: Arc<dyn OutcomeSource> = match cli.force_outcome {
        Some(branch) => {
            tracing::warn!(choice = %branch, "unstable operation pinned to one branch");
            Arc::new(FixedOutcome(branch))
        }
        None => Arc::new(RandomOutcomes),
    };

    let listener = bind(&config.service.bind_address).await?;
    let server = ServiceServer::new(config, source);
    tracing::debug!(unstable = ?server.config().unstable, "Unstable policy");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
