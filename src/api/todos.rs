//! Todo CRUD endpoints.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post},
    Json, Router,
};
use futures::stream::Stream;
use tokio::sync::broadcast;

use super::routes::AppState;
use super::todo_store::StoreError;
use super::types::{CreateTodoRequest, ListTodosQuery};
use crate::todo::{Outcome, Todo, TodoPatch};

/// Create todo routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/events", get(events))
        .route("/:id", patch(update_todo).delete(delete_todo))
        .route("/:id/trash", post(trash_todo))
}

type OutcomeResponse = Result<(StatusCode, Json<Outcome<Todo>>), (StatusCode, String)>;

fn internal(e: StoreError) -> (StatusCode, String) {
    tracing::error!("Store failure: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Business-rule failures are 422 with the outcome body.
fn respond(outcome: Outcome<Todo>, success: StatusCode) -> (StatusCode, Json<Outcome<Todo>>) {
    let status = if outcome.is_success() {
        success
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(outcome))
}

/// GET /api/todos
async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<Vec<Todo>>, (StatusCode, String)> {
    state
        .actions
        .list(query.filter)
        .await
        .map(Json)
        .map_err(internal)
}

/// POST /api/todos
async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTodoRequest>,
) -> OutcomeResponse {
    let outcome = state
        .actions
        .create(&req.description())
        .await
        .map_err(internal)?;
    Ok(respond(outcome, StatusCode::CREATED))
}

/// PATCH /api/todos/:id
async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TodoPatch>,
) -> OutcomeResponse {
    let outcome = state
        .actions
        .update(&id, patch)
        .await
        .map_err(internal)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// DELETE /api/todos/:id
async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> OutcomeResponse {
    let outcome = state.actions.delete(&id).await.map_err(internal)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// POST /api/todos/:id/trash
async fn trash_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> OutcomeResponse {
    let outcome = state.actions.trash(&id).await.map_err(internal)?;
    Ok(respond(outcome, StatusCode::OK))
}

/// GET /api/todos/events - change events as server-sent events.
async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.actions.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    match Event::default().event("change").json_data(&change) {
                        Ok(event) => yield Ok(event),
                        Err(e) => tracing::warn!("Failed to encode change event: {}", e),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    yield Ok(Event::default().event("lagged").data(skipped.to_string()));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}
