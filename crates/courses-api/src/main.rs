use std::env;

use courses::config::{ResolverConfig, SimulationConfig};
use courses_api::run_server;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let resolver_config = ResolverConfig::from_env();
    if resolver_config.primary.api_key.is_none() {
        tracing::warn!("No primary directions key configured; requests will skip that provider");
    }

    let port = env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or(3001);

    run_server(resolver_config, SimulationConfig::default(), port).await
}
