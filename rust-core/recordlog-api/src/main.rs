// SPDX-License-Identifier: PMPL-1.0-or-later
//! recordlog API server binary
//!
//! Starts the HTTP produce/consume server. Configuration comes from
//! `RECORDLOG_*` environment variables (see [`recordlog_api::ApiConfig`]).

use recordlog_api::ApiConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env()?;

    tracing::info!(
        "Starting recordlog API server on {}:{}",
        config.host,
        config.port
    );

    recordlog_api::serve(config).await?;

    Ok(())
}
