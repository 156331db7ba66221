//! Background echo server bound to a local port.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::routes::router;

/// How long `shutdown` waits for open connections to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors starting the echo server.
#[derive(Debug, thiserror::Error)]
pub enum EchoError {
    /// The listening socket could not be opened.
    #[error("failed to bind echo server on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// A running echo server.
///
/// The server stops when this handle is dropped or `shutdown` is awaited.
#[derive(Debug)]
pub struct EchoServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl EchoServer {
    /// Starts a server on an ephemeral loopback port.
    ///
    /// # Errors
    ///
    /// Returns `Bind` if no port can be opened.
    pub async fn spawn() -> Result<Self, EchoError> {
        Self::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await
    }

    /// Starts a server on `addr`.
    ///
    /// # Errors
    ///
    /// Returns `Bind` if the address cannot be opened.
    pub async fn bind(addr: SocketAddr) -> Result<Self, EchoError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| EchoError::Bind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| EchoError::Bind { addr, source })?;

        let (tx, rx) = oneshot::channel::<()>();
        let app = router().into_make_service_with_connect_info::<SocketAddr>();

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "echo server stopped with error");
            }
        });

        tracing::info!(%addr, "echo server listening");
        Ok(Self {
            addr,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    /// The bound socket address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:{port}`, suitable as a harness base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stops accepting connections and waits, up to a few seconds, for
    /// in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                task.abort();
            }
        }
        tracing::debug!(addr = %self.addr, "echo server shut down");
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
