//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::{
    handler::{api_health, get_room_detail, health, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid frontend origin '{0}'")]
    InvalidOrigin(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Room server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(repository, message_pusher, clock, config.room_ttl);
/// Server::new(config, state).run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Build the router with every endpoint and the CORS/trace layers
    pub fn router(&self) -> Result<Router, ServerError> {
        let origin = HeaderValue::from_str(&self.config.frontend_origin)
            .map_err(|_| ServerError::InvalidOrigin(self.config.frontend_origin.clone()))?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);

        Ok(Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health))
            .route("/api/health", get(api_health))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .with_state(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http()))
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Irori server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::StoreRoomRepository,
        store::InMemoryRoomStore,
    };
    use irori_shared::time::SystemClock;

    fn state() -> AppState {
        AppState::new(
            Arc::new(StoreRoomRepository::new(Arc::new(InMemoryRoomStore::new()))),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(SystemClock),
            std::time::Duration::from_secs(60),
        )
    }

    #[test]
    fn test_router_rejects_invalid_origin() {
        // テスト項目: ヘッダー値にできない origin は起動前にエラーになる
        // given (前提条件):
        let config = ServerConfig {
            frontend_origin: "http://bad\norigin".to_string(),
            ..ServerConfig::default()
        };
        let server = Server::new(config, state());

        // when (操作):
        let result = server.router();

        // then (期待する結果):
        assert!(matches!(result, Err(ServerError::InvalidOrigin(_))));
    }

    #[test]
    fn test_router_builds_with_default_config() {
        // テスト項目: デフォルト設定でルーターを組み立てられる
        // given (前提条件):
        let server = Server::new(ServerConfig::default(), state());

        // when (操作):
        let result = server.router();

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
