//! HTTP server lifecycle: bind, spawn the axum server in a background
//! task, return a handle with a shutdown channel.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::api_router;
use crate::core_state::CoreState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server task failed: {0}")]
    Task(String),
}

/// Handle to a running API server.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ApiServer {
    /// Bound address. Differs from the requested one when port 0 was used.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Signal shutdown and wait for in-flight requests to drain.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        self.shutdown();
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))
    }
}

/// Bind `addr` and serve the API router in a background task.
pub async fn start_api_server(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = api_router(core);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::core_state::testing::{core, sign_in};

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _rx) = core();
        let server = start_api_server(core, loopback())
            .await
            .expect("server should start");
        assert!(server.addr().port() > 0);

        let url = format!("http://{}/api/health", server.addr());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn serves_protected_routes() {
        let (core, _rx) = core();
        let (_, token) = sign_in(&core, "jane@example.com", false).await;
        let server = start_api_server(core, loopback()).await.unwrap();
        let base = format!("http://{}", server.addr());
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("{base}/api/appointments"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        let resp = client
            .get(format!("{base}/api/appointments"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let resp = client.get(format!("{base}/nonexistent")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn bind_conflict_reported() {
        let (core, _rx) = core();
        let first = start_api_server(Arc::clone(&core), loopback()).await.unwrap();
        let err = start_api_server(core, first.addr()).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
        first.stop().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _rx) = core();
        let mut server = start_api_server(core, loopback()).await.unwrap();
        server.shutdown();
        server.shutdown();
        server.stop().await.unwrap();
    }
}
