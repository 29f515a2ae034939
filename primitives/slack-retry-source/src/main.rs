//! Slack Retry Source binary.
//!
//! # Usage
//!
//! ```bash
//! # Signing secret from Parameter Store (retry_sync_slackapp_secret)
//! slack-retry-source --channel-id C0123456
//!
//! # Custom port, path and topic
//! slack-retry-source --channel-id C0123456 --port 3000 --path /retry --topic employee.sync.retry
//!
//! # Local development with a fixed signing secret
//! slack-retry-source --channel-id C0123456 --signing-secret my-secret
//! ```
//!
//! # Events Published
//!
//! - `slack.retry_sync.requested` (or `--topic`) - the full slash-command form

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use emergent_client::EmergentSource;
use slack_retry_source::{
    Dispatcher,
    config::Args,
    publisher::EmergentPublisher,
    secrets::{SecretProvider, SsmSecretProvider, StaticSecretProvider},
    server,
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Get the source name from environment (set by engine) or use default
    let name = std::env::var("EMERGENT_NAME").unwrap_or_else(|_| "slack-retry-source".to_string());

    // Connect to the Emergent engine (silently - lifecycle events come from engine)
    let source = match EmergentSource::connect(&name).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!(error = %e, "failed to connect to Emergent engine");
            std::process::exit(1);
        }
    };

    let secrets: Arc<dyn SecretProvider> = match args.signing_secret.clone() {
        Some(secret) => {
            info!("using fixed signing secret");
            Arc::new(StaticSecretProvider::new(secret))
        }
        None => Arc::new(SsmSecretProvider::from_env(args.region.clone()).await),
    };

    let dispatcher = Dispatcher::new(
        args.dispatch_config(),
        secrets,
        Arc::new(EmergentPublisher::new(source.clone())),
    );

    let app = server::router(&args.path, dispatcher);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    // Set up SIGTERM handler for graceful shutdown
    let mut sigterm = signal(SignalKind::terminate())?;

    let server = axum::serve(
        tokio::net::TcpListener::bind(&addr).await?,
        app.into_make_service(),
    );

    info!(
        %addr,
        path = %args.path,
        channel_id = %args.channel_id,
        topic = %args.topic,
        "listening for slash commands"
    );

    tokio::select! {
        result = server => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("shutting down");
            let _ = source.disconnect().await;
        }
    }

    Ok(())
}
