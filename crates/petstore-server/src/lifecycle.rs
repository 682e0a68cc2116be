// ABOUTME: Service lifecycle: open the store, serve HTTP, wait for a shutdown signal, clean up.
// ABOUTME: Every failure along the way is collected and returned instead of aborting cleanup.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use petstore_core::ServerConfig;
use petstore_store::{PetStore, StoreError};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use crate::app_state::AppState;
use crate::routes::create_router;

/// Why the server is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Ctrl-C or an equivalent interrupt.
    Interrupt,
    /// The process was asked to terminate.
    Terminate,
    /// The listener failed and stopped itself.
    Quit,
}

/// Errors collected over one run of the server, in the order they happened.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot open store: {0}")]
    Open(#[source] StoreError),

    #[error("http listener failed: {0}")]
    Listen(#[source] std::io::Error),

    #[error("http listener did not shut down cleanly: {0}")]
    Shutdown(String),

    #[error("http listener did not stop within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("cannot close store: {0}")]
    Close(#[source] StoreError),
}

/// Cloneable view of a running server: request shutdown and observe the
/// listener from other tasks.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    signals: mpsc::Sender<ShutdownSignal>,
    listening: Arc<AtomicBool>,
    local_addr: Arc<OnceLock<SocketAddr>>,
}

impl ServerHandle {
    /// Ask the server to stop. Only the first signal is acted on; later ones
    /// are dropped.
    pub fn shutdown(&self, signal: ShutdownSignal) {
        if self.signals.try_send(signal).is_err() {
            tracing::debug!("shutdown already requested, ignoring {:?}", signal);
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// The bound address, available once the listener has started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    fn set_listening(&self, listening: bool) {
        self.listening.store(listening, Ordering::SeqCst);
    }
}

/// Runs the pet API on top of a storage backend.
///
/// `start` opens the store before the listener is spawned and closes it only
/// after the listener task has finished, whatever the reason for stopping.
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn PetStore>,
    router: Router,
    handle: ServerHandle,
    signals: mpsc::Receiver<ShutdownSignal>,
}

impl Server {
    pub fn new(config: ServerConfig, store: Arc<dyn PetStore>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let router = create_router(Arc::new(AppState::new(Arc::clone(&store))));

        Self {
            config,
            store,
            router,
            handle: ServerHandle {
                signals: tx,
                listening: Arc::new(AtomicBool::new(false)),
                local_addr: Arc::new(OnceLock::new()),
            },
            signals: rx,
        }
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Run until a shutdown signal arrives. Returns every error encountered;
    /// an empty list means a clean start and stop.
    pub async fn start(mut self) -> Vec<ServerError> {
        tracing::info!("starting server");
        let mut errors = Vec::new();

        tracing::info!("opening data store");
        match self.store.open() {
            Ok(()) => self.serve_until_signal(&mut errors).await,
            Err(e) => errors.push(ServerError::Open(e)),
        }

        tracing::info!("closing data store");
        if let Err(e) = self.store.close() {
            errors.push(ServerError::Close(e));
        }

        tracing::info!("server stopped");
        errors
    }

    async fn serve_until_signal(&mut self, errors: &mut Vec<ServerError>) {
        let (stop_tx, stop_rx) = oneshot::channel();
        tracing::info!(
            "opening http server at {}:{}",
            self.config.host,
            self.config.port
        );
        let mut listener = tokio::spawn(listen(
            self.config.clone(),
            self.router.clone(),
            self.handle.clone(),
            stop_rx,
        ));

        // The server keeps its own sender alive, so the channel never closes.
        let signal = self.signals.recv().await.unwrap_or(ShutdownSignal::Quit);
        match signal {
            ShutdownSignal::Interrupt => tracing::info!("got interrupt signal, closing"),
            ShutdownSignal::Terminate => tracing::info!("got termination signal, closing"),
            ShutdownSignal::Quit => tracing::info!("got quit signal, closing"),
        }

        tracing::info!("closing http server");
        let _ = stop_tx.send(());

        let joined = match self.config.shutdown_timeout() {
            Some(limit) => match tokio::time::timeout(limit, &mut listener).await {
                Ok(joined) => joined,
                Err(_) => {
                    listener.abort();
                    self.handle.set_listening(false);
                    errors.push(ServerError::ShutdownTimeout(limit));
                    return;
                }
            },
            None => listener.await,
        };

        match joined {
            Ok(Ok(())) => tracing::info!("http server closed"),
            Ok(Err(e)) => errors.push(ServerError::Listen(e)),
            Err(e) => errors.push(ServerError::Shutdown(e.to_string())),
        }
        self.handle.set_listening(false);
    }
}

/// Listener task body. On failure it clears the listening flag and asks the
/// lifecycle to quit, so a dead listener takes the same shutdown path as a
/// signal.
async fn listen(
    config: ServerConfig,
    router: Router,
    handle: ServerHandle,
    stop: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let result = serve(&config, router, &handle, stop).await;
    if let Err(e) = &result {
        tracing::error!("http server failed: {}", e);
        handle.set_listening(false);
        handle.shutdown(ShutdownSignal::Quit);
    }
    result
}

async fn serve(
    config: &ServerConfig,
    router: Router,
    handle: &ServerHandle,
    stop: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let _ = handle.local_addr.set(addr);
    handle.set_listening(true);
    tracing::info!("http server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stop.await;
        })
        .await
}
