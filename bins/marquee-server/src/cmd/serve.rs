use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use marquee_engine::Gallery;

use crate::cmd::load_config;
use crate::config::ConfigArgs;
use crate::connector::SchemeConnector;
use crate::error::ServerError;

pub async fn run(args: ConfigArgs) -> Result<(), ServerError> {
    tracing::info!("marquee-server starting");

    // --- Load config ---
    let config = load_config(&args)?;
    tracing::info!(config = %args.config, targets = config.targets.len(), "loaded config");

    // --- Gallery ---
    let gallery = Arc::new(Gallery::bootstrap(&config, Arc::new(SchemeConnector::new()))?);
    let reachable = gallery.probe().await;
    if reachable == 0 {
        tracing::warn!("no target reachable at startup, requests will fail until one recovers");
    }

    // --- API server ---
    let token = CancellationToken::new();
    let address = format!("{}:{}", config.bind_address, config.api_port);
    let mut api_handle = tokio::spawn({
        let gallery = gallery.clone();
        let token = token.clone();
        async move { marquee_api_server::run(&address, gallery, token).await }
    });
    tracing::info!(port = config.api_port, "server ready");

    // --- Wait for Ctrl+C / SIGTERM or an early server exit ---
    let early_exit = tokio::select! {
        signal = shutdown_signal() => {
            signal?;
            None
        }
        result = &mut api_handle => Some(result),
    };

    token.cancel();

    let served = match early_exit {
        Some(result) => result,
        // Drain: give in-flight requests up to 5s
        None => match tokio::time::timeout(Duration::from_secs(5), &mut api_handle).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("api server did not drain in time, aborting");
                api_handle.abort();
                Ok(Ok(()))
            }
        },
    };

    gallery.shutdown().await;

    match served {
        Ok(Ok(())) => {
            tracing::info!("shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => Err(ServerError::Api(e)),
        Err(join) => Err(ServerError::Api(std::io::Error::other(join))),
    }
}

async fn shutdown_signal() -> Result<(), ServerError> {
    #[cfg(unix)]
    {
        let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .map_err(ServerError::Signal)?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => {
                r.map_err(ServerError::Signal)?;
                tracing::info!("received Ctrl+C, shutting down");
            }
            _ = terminate.recv() => {
                tracing::info!("received terminate signal, shutting down");
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map_err(ServerError::Signal)?;
        tracing::info!("received Ctrl+C, shutting down");
        Ok(())
    }
}
