use anyhow::Context;
use dirabus_cli::{run, AppState};
use dirabus_store::{app_config::Config, ApiClient};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not interleave with the seat map.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dirabus_cli=info,dirabus_store=info,dirabus_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Using booking backend at {}", config.api.base_url);

    let api = ApiClient::new(&config.api).context("Failed to build HTTP client")?;
    let state = AppState::new(api, config.credentials(), config.display.currency.clone());
    if !state.credentials.is_authenticated() {
        tracing::warn!("No auth token configured; booking and dashboard calls will be rejected");
    }

    run(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}
