//! Test server harness.

use rerank::gateway::{HandlerState, create_router_with_state};
use rerank::model::{BackendSlot, MockBackend, MockBehavior};
use rerank::service::RerankService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub batch_size: usize,
    pub behavior: MockBehavior,
    /// Sleep inside every backend call.
    pub delay: Option<Duration>,
    /// Start with an empty backend slot (install later via [`TestServer::install`]).
    pub start_unloaded: bool,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            behavior: MockBehavior::Score,
            delay: None,
            start_unloaded: false,
        }
    }
}

impl TestServerConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unloaded(mut self) -> Self {
        self.start_unloaded = true;
        self
    }

    fn build_backend(&self) -> MockBackend {
        let backend = MockBackend::with_behavior(self.behavior.clone());
        match self.delay {
            Some(delay) => backend.with_delay(delay),
            None => backend,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    slot: Arc<BackendSlot<MockBackend>>,
    pending_backend: Option<MockBackend>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The installed mock backend, for inspecting recorded calls.
    pub fn backend(&self) -> &MockBackend {
        self.slot
            .get()
            .expect("backend not installed; call install() first")
    }

    /// Installs the backend held back by [`TestServerConfig::unloaded`].
    pub fn install(&mut self) {
        if let Some(backend) = self.pending_backend.take() {
            assert!(self.slot.install(backend).is_ok(), "backend installed twice");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server on an ephemeral port backed by a [`MockBackend`].
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let backend = config.build_backend();
    let (slot, pending_backend) = if config.start_unloaded {
        (Arc::new(BackendSlot::empty()), Some(backend))
    } else {
        (Arc::new(BackendSlot::ready(backend)), None)
    };

    let service = RerankService::new(slot.clone(), config.batch_size)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let app = create_router_with_state(HandlerState::new(Arc::new(service)));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        slot,
        pending_backend,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
