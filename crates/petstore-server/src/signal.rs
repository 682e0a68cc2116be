// ABOUTME: Bridges OS shutdown signals onto a server's shutdown channel.
// ABOUTME: Only the binary installs it, so tests drive shutdown through ServerHandle directly.

use tokio::task::JoinHandle;

use crate::lifecycle::{ServerHandle, ShutdownSignal};

/// Spawn a task that forwards the first Ctrl-C (and, on unix, SIGTERM) to
/// the server.
pub fn forward_os_signals(handle: ServerHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        handle.shutdown(signal);
    })
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> ShutdownSignal {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("cannot listen for termination signal: {}", e);
            interrupt().await;
            return ShutdownSignal::Interrupt;
        }
    };

    tokio::select! {
        _ = interrupt() => ShutdownSignal::Interrupt,
        _ = terminate.recv() => ShutdownSignal::Terminate,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> ShutdownSignal {
    interrupt().await;
    ShutdownSignal::Interrupt
}
