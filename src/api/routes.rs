//! HTTP route handlers.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::todo::{TodoActions, TodoService};

use super::board::{self, BoardActions, BoardHandle, BoardSettings};
use super::todo_store::{create_todo_store, TodoStore};
use super::todos;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Store operations with change notifications
    pub actions: TodoActions,
    /// Optimistic board actor
    pub board: BoardHandle,
}

impl AppState {
    /// Wire the actions and spawn the board over an already opened store.
    pub fn new(config: Config, store: Arc<dyn TodoStore>) -> Self {
        let actions = TodoActions::new(TodoService::new(store));
        let board_actions: Arc<dyn BoardActions> = Arc::new(actions.clone());
        let board = BoardHandle::spawn(board_actions, BoardSettings::from(&config));
        Self {
            config,
            actions,
            board,
        }
    }
}

/// Build the application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/todos", todos::routes())
        .nest("/api/board", board::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let db_path = config.database_path();
    let store: Arc<dyn TodoStore> =
        Arc::from(create_todo_store(config.store_type, db_path.clone()).await?);
    if store.is_persistent() {
        tracing::info!("Todo store opened at {}", db_path.display());
    } else {
        tracing::warn!("Using in-memory todo store; todos are lost on restart");
    }

    let state = Arc::new(AppState::new(config.clone(), store));
    match state.board.load().await {
        Ok(visible) => tracing::info!(visible, "Board loaded"),
        Err(e) => tracing::warn!("Failed to load board: {}", e),
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal(shutdown_state).await;
        })
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM, then stop the board.
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping board...");

    if let Err(e) = state.board.shutdown().await {
        tracing::warn!("Board did not shut down cleanly: {}", e);
    }

    tracing::info!("Graceful shutdown complete");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        env: state.config.env.to_string(),
        persistent: state.actions.service().store().is_persistent(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::todo_store::InMemoryTodoStore;
    use crate::config::AppEnv;
    use std::path::PathBuf;

    fn state() -> Arc<AppState> {
        let config = Config::new(AppEnv::Test, PathBuf::from("."));
        Arc::new(AppState::new(config, Arc::new(InMemoryTodoStore::new())))
    }

    #[tokio::test]
    async fn test_health_reports_environment() {
        let Json(body) = health(State(state())).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.env, "test");
        assert!(!body.persistent);
    }

    #[tokio::test]
    async fn test_board_sees_todos_created_through_actions() {
        let state = state();
        state.actions.create("Buy groceries").await.unwrap();
        assert_eq!(state.board.load().await.unwrap(), 1);
        let snapshot = state.board.snapshot().await.unwrap();
        assert_eq!(snapshot.todos[0].description, "Buy groceries");
    }

    #[tokio::test]
    async fn test_board_delete_reaches_store() {
        let state = state();
        let todo = state
            .actions
            .create("Buy groceries")
            .await
            .unwrap()
            .into_value()
            .unwrap();
        state.board.load().await.unwrap();
        let mut changes = state.actions.subscribe();

        state.board.request_delete(todo.clone()).await.unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(change.todo, todo);
        assert!(state
            .actions
            .list(crate::todo::TodoFilter::All)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _app = app(state());
    }
}
