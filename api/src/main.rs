use anyhow::Context;
use clap::Parser;
use eventhub_api::{config::EventhubApiConfig, server};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EventhubApiConfig::parse();

    if config.dump_openapi {
        let json = server::openapi()
            .to_pretty_json()
            .context("failed to serialize OpenAPI document")?;
        print!("{}", json);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or("eventhub_api=info,eventhub_db=info,tower_http=info".into()),
        )
        .pretty()
        .init();

    let (router, _api) = server::make(config.clone()).await?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{:?}", config.bind_addr);

    axum::serve(listener, router)
        .await
        .context("server exited with an error")?;

    Ok(())
}
