//! Startup and shutdown ordering.
//!
//! The HTTP API runs on its own thread and multi-threaded runtime. The
//! Discord connection runs on the main thread in a current-thread runtime,
//! which is also where every chat send executes.

use std::sync::Arc;

use {
    anyhow::{Context, Result},
    relaybot_config::RelayConfig,
    relaybot_discord::RelayHandler,
    relaybot_gateway::{AppState, ChatBridge, InboundRelay, SignatureCodec},
    secrecy::ExposeSecret,
    tracing::{error, info, warn},
};

/// Run the relay until a termination signal arrives.
pub fn run(config: RelayConfig) -> Result<()> {
    let codec = SignatureCodec::new(&config.shared_secret)
        .map_err(|e| anyhow::anyhow!("invalid signing key: {e}"))?
        .with_leeway(config.signature_leeway_secs);
    let bridge = ChatBridge::new();

    // Bind before spawning so a busy port fails startup instead of a thread.
    let listener = std::net::TcpListener::bind((config.bind.as_str(), config.port))
        .with_context(|| format!("failed to bind {}:{}", config.bind, config.port))?;
    listener.set_nonblocking(true)?;
    spawn_http_api(listener, AppState::new(codec, bridge.clone()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build gateway runtime")?;
    runtime.block_on(run_gateway(&config, bridge))
}

/// Serve the HTTP API on a detached thread. It is not drained on shutdown.
fn spawn_http_api(listener: std::net::TcpListener, state: AppState) -> Result<()> {
    std::thread::Builder::new()
        .name("relay-http".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name("relay-http-worker")
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to build HTTP runtime");
                    return;
                },
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(l) => l,
                    Err(e) => {
                        error!(error = %e, "failed to adopt HTTP listener");
                        return;
                    },
                };
                if let Err(e) = relaybot_gateway::server::serve(listener, state).await {
                    error!(error = %e, "relay API stopped");
                }
            });
        })
        .context("failed to spawn HTTP thread")?;
    Ok(())
}

/// Body of the gateway runtime.
async fn run_gateway(config: &RelayConfig, bridge: ChatBridge) -> Result<()> {
    // Resources bound to this runtime are created only now that it runs.
    let relay = Arc::new(
        InboundRelay::new(config.forward_webhook.clone(), config.webhook_timeout())
            .context("failed to build webhook client")?,
    );
    info!(webhook_timeout_secs = config.webhook_timeout_secs, "webhook client ready");

    let handler = RelayHandler::new(Arc::clone(&relay), bridge.clone());
    let mut client =
        relaybot_discord::build_client(config.discord_token.expose_secret(), handler)
            .await
            .context("failed to build discord client")?;
    let shard_manager = Arc::clone(&client.shard_manager);

    let outcome = tokio::select! {
        res = client.start() => res.context("discord gateway stopped"),
        () = shutdown_signal() => {
            info!("shutdown signal received");
            Ok(())
        },
    };

    // Chat connection first, then the shared HTTP client.
    bridge.detach().await;
    shard_manager.shutdown_all().await;
    drop(client);
    drop(relay);
    info!("relaybot stopped");
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
