//! Listener lifecycle.

use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Binds the webhook listener and serves it on a background task.
pub struct WebhookServer;

impl WebhookServer {
    /// Bind `addr` and start serving `app`.
    ///
    /// Returns once the socket is bound, so a bind failure surfaces here
    /// rather than inside the spawned task.
    pub async fn start(addr: SocketAddr, app: Router) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(addr = %local_addr, "Listening for webhooks");

        Ok(ServerHandle {
            local_addr,
            shutdown_tx,
            task,
        })
    }
}

/// Handle to a running listener.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        // The task may already have exited; its result is reported below.
        let _ = self.shutdown_tx.send(());
        self.task.await??;
        info!(addr = %self.local_addr, "Webhook listener stopped");
        Ok(())
    }
}
