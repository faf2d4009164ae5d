//! Console harness entry point.

use std::process::ExitCode;

use checkout::{CheckoutConfig, CheckoutService, InMemoryOrderStore};
use console::{Config, ConsoleError, Session};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "checkout session failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<(), ConsoleError> {
    // 2. Load the session
    let path = &config.session_path;
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConsoleError::Io {
            path: path.clone(),
            source,
        })?;
    let session = Session::from_json(&json)?;

    // 3. Wire the service
    let pricing = CheckoutConfig::from_env();
    tracing::info!(tax_rate = %pricing.tax_rate, delivery_fee = %pricing.delivery_fee, "pricing loaded");
    let service = CheckoutService::new(InMemoryOrderStore::new(), pricing);

    // 4. Run and print
    let receipt = console::run_session(&service, session).await?;
    print!("{receipt}");
    Ok(())
}
