//! Rerank HTTP server entrypoint.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use rerank::config::Config;
use rerank::constants::DEFAULT_PORT;
use rerank::gateway::{HandlerState, create_router_with_state};
use rerank::model::{BackendError, BackendSlot, CrossEncoder, CrossEncoderConfig};
use rerank::service::RerankService;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        batch_size = config.batch_size,
        max_seq_len = config.max_seq_len,
        payload_limit = config.payload_limit,
        "Rerank server starting"
    );

    let slot: Arc<BackendSlot<CrossEncoder>> = Arc::new(BackendSlot::empty());
    let service = Arc::new(RerankService::new(slot.clone(), config.batch_size)?);
    let app = create_router_with_state(
        HandlerState::new(service).with_payload_limit(config.payload_limit),
    );

    let encoder_config = CrossEncoderConfig::from(&config);
    let mut loader = tokio::task::spawn_blocking(move || load_backend(&slot, encoder_config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    tokio::pin!(server);

    let loaded = tokio::select! {
        result = &mut server => {
            result?;
            None
        }
        loaded = &mut loader => Some(loaded),
    };

    if let Some(loaded) = loaded {
        if let Err(e) = loaded? {
            tracing::error!(error = %e, "Failed to load scoring backend");
            return Err(e.into());
        }
        server.await?;
    }

    tracing::info!("Rerank server shutdown complete");
    Ok(())
}

fn load_backend(
    slot: &BackendSlot<CrossEncoder>,
    config: CrossEncoderConfig,
) -> Result<(), BackendError> {
    let encoder = CrossEncoder::load(config)?;
    let model_loaded = encoder.is_model_loaded();

    if slot.install(encoder).is_err() {
        tracing::warn!("Scoring backend already installed, discarding duplicate");
        return Ok(());
    }

    tracing::info!(model_loaded, "Scoring backend ready");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/health", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
