//! Optimistic todo board.
//!
//! A single actor owns what the user currently sees:
//! - the visible list, updated before the store confirms anything
//! - pending deletions, each with an undo window and an in-flight delete
//! - notices (the toast stream) broadcast to every subscriber
//!
//! All state is mutated on the actor task. Store calls and undo timers run as
//! separate tasks and report back through an internal channel, tagged with
//! the sequence number of the request that started them so late or stale
//! reports are recognized.
//!
//! Undoing a deletion whose store call is still running marks it as undone;
//! if that call later succeeds, the original row is written back. Deleting
//! the same task again meanwhile queues the new store call behind the undone
//! one, so the write-back never overrides the latest request.

use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::api::todo_store::StoreError;
use crate::config::Config;
use crate::todo::{validate_description, Outcome, Todo, TodoActions, TodoFilter, ID_EXISTS};
use crate::util::{now_string, sanitize_str};

use super::routes::AppState;
use super::types::CreateTodoRequest;

/// Prefix of ids given to optimistically created tasks.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Store operations the board depends on.
#[async_trait]
pub trait BoardActions: Send + Sync + 'static {
    /// Tasks the board should display.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn create(&self, description: &str) -> Result<Outcome<Todo>, StoreError>;

    async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError>;

    /// Write a deleted snapshot back unchanged.
    async fn restore(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError>;
}

#[async_trait]
impl BoardActions for TodoActions {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        TodoActions::list(self, TodoFilter::Active).await
    }

    async fn create(&self, description: &str) -> Result<Outcome<Todo>, StoreError> {
        TodoActions::create(self, description).await
    }

    async fn delete(&self, id: &str) -> Result<Outcome<Todo>, StoreError> {
        TodoActions::delete(self, id).await
    }

    async fn restore(&self, todo: Todo) -> Result<Outcome<Todo>, StoreError> {
        TodoActions::restore(self, todo).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoardSettings {
    /// How long a deletion stays undoable
    pub undo_window: Duration,
    /// Display hint for the "restored" notice
    pub restored_notice: Duration,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            undo_window: Duration::from_millis(5000),
            restored_notice: Duration::from_millis(500),
        }
    }
}

impl From<&Config> for BoardSettings {
    fn from(config: &Config) -> Self {
        Self {
            undo_window: config.undo_window,
            restored_notice: config.restored_notice,
        }
    }
}

/// User-facing notification. `handle` identifies the notice a later one
/// replaces (a failure or restore replaces the "deleted" notice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Deleted {
        handle: u64,
        id: String,
        description: String,
        undo_window_ms: u64,
    },
    Restored {
        handle: u64,
        id: String,
        duration_ms: u64,
    },
    DeleteFailed {
        handle: u64,
        id: String,
        reason: String,
    },
    RestoreFailed {
        id: String,
        reason: String,
    },
    Created {
        id: String,
        description: String,
    },
    CreateFailed {
        errors: Vec<String>,
    },
}

impl Notice {
    pub fn event_name(&self) -> &'static str {
        match self {
            Notice::Deleted { .. } => "deleted",
            Notice::Restored { .. } => "restored",
            Notice::DeleteFailed { .. } => "delete_failed",
            Notice::RestoreFailed { .. } => "restore_failed",
            Notice::Created { .. } => "created",
            Notice::CreateFailed { .. } => "create_failed",
        }
    }
}

/// What happened to a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRequest {
    Started,
    AlreadyPending,
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub todos: Vec<Todo>,
    /// Ids with a deletion inside its undo window
    pub pending: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board is shut down")]
    Closed,

    #[error("{0}")]
    Action(String),
}

enum BoardCommand {
    Load {
        respond: oneshot::Sender<Result<usize, String>>,
    },
    RequestDelete {
        todo: Todo,
        respond: oneshot::Sender<DeleteRequest>,
    },
    CancelDeletion {
        id: String,
        respond: oneshot::Sender<bool>,
    },
    RequestCreate {
        description: String,
        respond: oneshot::Sender<Result<Outcome<Todo>, String>>,
    },
    Snapshot {
        respond: oneshot::Sender<BoardSnapshot>,
    },
    Shutdown {
        respond: oneshot::Sender<()>,
    },
}

/// Reports from tasks spawned by the actor.
enum BoardEvent {
    Loaded {
        result: Result<Vec<Todo>, String>,
        respond: oneshot::Sender<Result<usize, String>>,
    },
    DeleteResolved {
        id: String,
        seq: u64,
        snapshot: Todo,
        result: Result<Outcome<Todo>, String>,
    },
    WindowExpired {
        id: String,
        seq: u64,
    },
    CreateResolved {
        temp_id: String,
        result: Result<Outcome<Todo>, String>,
        respond: oneshot::Sender<Result<Outcome<Todo>, String>>,
    },
    RestoreFailed {
        id: String,
        reason: String,
    },
}

struct PendingDeletion {
    todo: Todo,
    seq: u64,
    timer: JoinHandle<()>,
}

/// Store delete waiting for an undone delete of the same id to report.
struct QueuedDelete {
    seq: u64,
    snapshot: Todo,
}

/// Cloneable handle to the board actor.
#[derive(Clone)]
pub struct BoardHandle {
    cmd_tx: mpsc::Sender<BoardCommand>,
    notices: broadcast::Sender<Notice>,
}

impl BoardHandle {
    /// Spawn the board actor. The visible list starts empty; call [`load`](Self::load).
    pub fn spawn(actions: Arc<dyn BoardActions>, settings: BoardSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<BoardCommand>(256);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel::<BoardEvent>();
        let (notices, _) = broadcast::channel::<Notice>(256);

        let actor = BoardActor {
            actions,
            settings,
            todos: Vec::new(),
            pending: HashMap::new(),
            undone: HashMap::new(),
            queued: HashMap::new(),
            next_seq: 0,
            notices: notices.clone(),
            internal_tx,
        };
        tokio::spawn(board_actor_loop(actor, cmd_rx, internal_rx));

        Self { cmd_tx, notices }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> BoardCommand,
    ) -> Result<T, BoardError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(command(tx))
            .await
            .map_err(|_| BoardError::Closed)?;
        rx.await.map_err(|_| BoardError::Closed)
    }

    /// Replace the visible list with the store's active tasks. Returns how
    /// many are visible afterwards.
    pub async fn load(&self) -> Result<usize, BoardError> {
        self.call(|respond| BoardCommand::Load { respond })
            .await?
            .map_err(BoardError::Action)
    }

    /// Hide `todo` immediately and start deleting it.
    pub async fn request_delete(&self, todo: Todo) -> Result<DeleteRequest, BoardError> {
        self.call(|respond| BoardCommand::RequestDelete { todo, respond })
            .await
    }

    /// Undo a pending deletion. Returns false when there is nothing to undo.
    pub async fn cancel_deletion(&self, id: &str) -> Result<bool, BoardError> {
        let id = id.to_string();
        self.call(|respond| BoardCommand::CancelDeletion { id, respond })
            .await
    }

    /// Show a placeholder right away and resolve once the store has answered.
    pub async fn request_create(&self, description: &str) -> Result<Outcome<Todo>, BoardError> {
        let description = description.to_string();
        self.call(|respond| BoardCommand::RequestCreate {
            description,
            respond,
        })
        .await?
        .map_err(BoardError::Action)
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot, BoardError> {
        self.call(|respond| BoardCommand::Snapshot { respond }).await
    }

    /// Stop the actor and cancel every undo timer.
    pub async fn shutdown(&self) -> Result<(), BoardError> {
        self.call(|respond| BoardCommand::Shutdown { respond })
            .await
    }
}

struct BoardActor {
    actions: Arc<dyn BoardActions>,
    settings: BoardSettings,
    todos: Vec<Todo>,
    pending: HashMap<String, PendingDeletion>,
    /// Undone deletions whose store call has not reported yet, by sequence
    undone: HashMap<u64, Todo>,
    /// Deletions held back until the undone delete for their id reports, by id
    queued: HashMap<String, QueuedDelete>,
    next_seq: u64,
    notices: broadcast::Sender<Notice>,
    internal_tx: mpsc::UnboundedSender<BoardEvent>,
}

async fn board_actor_loop(
    mut actor: BoardActor,
    mut cmd_rx: mpsc::Receiver<BoardCommand>,
    mut internal_rx: mpsc::UnboundedReceiver<BoardEvent>,
) {
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                if actor.handle_command(cmd).is_break() {
                    break;
                }
            }
            Some(event) = internal_rx.recv() => actor.handle_event(event),
        }
    }
    actor.teardown();
    tracing::debug!("Board actor stopped");
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl BoardActor {
    fn handle_command(&mut self, cmd: BoardCommand) -> ControlFlow<()> {
        match cmd {
            BoardCommand::Load { respond } => self.load(respond),
            BoardCommand::RequestDelete { todo, respond } => {
                let _ = respond.send(self.request_delete(todo));
            }
            BoardCommand::CancelDeletion { id, respond } => {
                let _ = respond.send(self.cancel_deletion(&id));
            }
            BoardCommand::RequestCreate {
                description,
                respond,
            } => self.request_create(description, respond),
            BoardCommand::Snapshot { respond } => {
                let _ = respond.send(self.snapshot());
            }
            BoardCommand::Shutdown { respond } => {
                self.teardown();
                let _ = respond.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_event(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Loaded { result, respond } => self.loaded(result, respond),
            BoardEvent::DeleteResolved {
                id,
                seq,
                snapshot,
                result,
            } => self.delete_resolved(id, seq, snapshot, result),
            BoardEvent::WindowExpired { id, seq } => self.window_expired(&id, seq),
            BoardEvent::CreateResolved {
                temp_id,
                result,
                respond,
            } => self.create_resolved(&temp_id, result, respond),
            BoardEvent::RestoreFailed { id, reason } => {
                tracing::error!(%id, %reason, "Undone deletion could not be written back");
                if !self.pending.contains_key(&id) {
                    self.todos.retain(|t| t.id != id);
                }
                self.notify(Notice::RestoreFailed { id, reason });
            }
        }
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Insert `todo` in newest-first order unless it is already visible.
    fn show(&mut self, todo: Todo) {
        if self.todos.iter().any(|t| t.id == todo.id) {
            return;
        }
        let position = self
            .todos
            .iter()
            .position(|t| {
                (&t.created_at, &t.description) < (&todo.created_at, &todo.description)
            })
            .unwrap_or(self.todos.len());
        self.todos.insert(position, todo);
    }

    fn snapshot(&self) -> BoardSnapshot {
        let mut pending: Vec<String> = self.pending.keys().cloned().collect();
        pending.sort();
        BoardSnapshot {
            todos: self.todos.clone(),
            pending,
        }
    }

    fn load(&mut self, respond: oneshot::Sender<Result<usize, String>>) {
        let actions = Arc::clone(&self.actions);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = actions.list().await.map_err(|e| e.to_string());
            let _ = tx.send(BoardEvent::Loaded { result, respond });
        });
    }

    fn loaded(
        &mut self,
        result: Result<Vec<Todo>, String>,
        respond: oneshot::Sender<Result<usize, String>>,
    ) {
        let todos = match result {
            Ok(todos) => todos,
            Err(e) => {
                tracing::warn!("Failed to load board: {}", e);
                let _ = respond.send(Err(e));
                return;
            }
        };
        let placeholders: Vec<Todo> = self
            .todos
            .drain(..)
            .filter(|t| t.id.starts_with(TEMP_ID_PREFIX))
            .collect();
        for todo in todos {
            if !todo.is_deleted() && !self.pending.contains_key(&todo.id) {
                self.show(todo);
            }
        }
        for placeholder in placeholders {
            self.show(placeholder);
        }
        tracing::debug!(visible = self.todos.len(), "Board loaded");
        let _ = respond.send(Ok(self.todos.len()));
    }

    fn request_delete(&mut self, todo: Todo) -> DeleteRequest {
        let id = sanitize_str(&todo.id);
        if id.is_empty() {
            return DeleteRequest::InvalidId;
        }
        if self.pending.contains_key(&id) || self.queued.contains_key(&id) {
            return DeleteRequest::AlreadyPending;
        }

        let snapshot = match self.todos.iter().position(|t| t.id == id) {
            Some(index) => self.todos.remove(index),
            None => todo,
        };
        let seq = self.next_seq();
        tracing::debug!(%id, seq, "Deletion requested");

        self.notify(Notice::Deleted {
            handle: seq,
            id: id.clone(),
            description: snapshot.description.clone(),
            undo_window_ms: millis(self.settings.undo_window),
        });

        let timer = {
            let tx = self.internal_tx.clone();
            let id = id.clone();
            let window = self.settings.undo_window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                let _ = tx.send(BoardEvent::WindowExpired { id, seq });
            })
        };

        self.pending.insert(
            id.clone(),
            PendingDeletion {
                todo: snapshot.clone(),
                seq,
                timer,
            },
        );

        if self.undone.values().any(|t| t.id == id) {
            tracing::debug!(%id, seq, "Deletion queued behind undone delete");
            self.queued.insert(id, QueuedDelete { seq, snapshot });
        } else {
            self.dispatch_delete(id, seq, snapshot);
        }

        DeleteRequest::Started
    }

    fn dispatch_delete(&self, id: String, seq: u64, snapshot: Todo) {
        let actions = Arc::clone(&self.actions);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = actions.delete(&id).await.map_err(|e| e.to_string());
            let _ = tx.send(BoardEvent::DeleteResolved {
                id,
                seq,
                snapshot,
                result,
            });
        });
    }

    fn cancel_deletion(&mut self, id: &str) -> bool {
        let id = sanitize_str(id);
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };
        pending.timer.abort();
        tracing::debug!(%id, seq = pending.seq, "Deletion undone");

        if self.queued.get(&id).is_some_and(|q| q.seq == pending.seq) {
            // Never reached the store.
            self.queued.remove(&id);
        } else {
            self.undone.insert(pending.seq, pending.todo.clone());
        }
        self.show(pending.todo);
        self.notify(Notice::Restored {
            handle: pending.seq,
            id,
            duration_ms: millis(self.settings.restored_notice),
        });
        true
    }

    fn delete_resolved(
        &mut self,
        id: String,
        seq: u64,
        snapshot: Todo,
        result: Result<Outcome<Todo>, String>,
    ) {
        if let Some(todo) = self.undone.remove(&seq) {
            let deleted = matches!(result, Ok(Outcome::Success(_)));
            match self.queued.remove(&id) {
                // Row already gone; the queued request is done.
                Some(queued) if deleted => {
                    tracing::debug!(%id, seq = queued.seq, "Deletion confirmed");
                    if self.pending.get(&id).is_some_and(|p| p.seq == queued.seq) {
                        if let Some(pending) = self.pending.remove(&id) {
                            pending.timer.abort();
                        }
                    }
                }
                Some(queued) => self.dispatch_delete(id, queued.seq, queued.snapshot),
                None if deleted => {
                    tracing::info!(%id, "Deletion finished after undo, writing row back");
                    self.spawn_restore(todo);
                }
                None => {}
            }
            return;
        }

        let is_current = self.pending.get(&id).is_some_and(|p| p.seq == seq);
        if is_current {
            if let Some(pending) = self.pending.remove(&id) {
                pending.timer.abort();
            }
        }

        let reason = match result {
            Ok(Outcome::Success(_)) => {
                tracing::debug!(%id, seq, "Deletion confirmed");
                return;
            }
            Ok(Outcome::Failure(errors)) => errors
                .into_iter()
                .next()
                .unwrap_or_else(|| "Unknown error".to_string()),
            Err(e) => e,
        };

        tracing::warn!(%id, seq, %reason, "Deletion failed, restoring task");
        // A newer request for the same id keeps it hidden.
        if !self.pending.contains_key(&id) {
            self.show(snapshot);
        }
        self.notify(Notice::DeleteFailed {
            handle: seq,
            id,
            reason,
        });
    }

    fn window_expired(&mut self, id: &str, seq: u64) {
        if self.pending.get(id).is_some_and(|p| p.seq == seq) {
            self.pending.remove(id);
            tracing::debug!(%id, seq, "Undo window closed");
        }
    }

    fn spawn_restore(&self, todo: Todo) {
        let actions = Arc::clone(&self.actions);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let id = todo.id.clone();
            let reason = match actions.restore(todo).await {
                Ok(Outcome::Success(_)) => return,
                // Someone already put it back.
                Ok(Outcome::Failure(errors)) if errors.iter().any(|e| e == ID_EXISTS) => return,
                Ok(Outcome::Failure(errors)) => errors.join(", "),
                Err(e) => e.to_string(),
            };
            let _ = tx.send(BoardEvent::RestoreFailed { id, reason });
        });
    }

    fn request_create(
        &mut self,
        description: String,
        respond: oneshot::Sender<Result<Outcome<Todo>, String>>,
    ) {
        let check = validate_description(&sanitize_str(&description));
        if !check.success {
            let _ = respond.send(Ok(Outcome::Failure(check.errors)));
            return;
        }

        let seq = self.next_seq();
        let placeholder = Todo {
            id: format!(
                "{}{}-{}",
                TEMP_ID_PREFIX,
                chrono::Utc::now().timestamp_millis(),
                seq
            ),
            description: sanitize_str(&description),
            created_at: now_string(),
            deleted_at: None,
        };
        let temp_id = placeholder.id.clone();
        self.show(placeholder);

        let actions = Arc::clone(&self.actions);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = actions
                .create(&description)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(BoardEvent::CreateResolved {
                temp_id,
                result,
                respond,
            });
        });
    }

    fn create_resolved(
        &mut self,
        temp_id: &str,
        result: Result<Outcome<Todo>, String>,
        respond: oneshot::Sender<Result<Outcome<Todo>, String>>,
    ) {
        self.todos.retain(|t| t.id != temp_id);
        match &result {
            Ok(Outcome::Success(todo)) => {
                self.show(todo.clone());
                self.notify(Notice::Created {
                    id: todo.id.clone(),
                    description: todo.description.clone(),
                });
            }
            Ok(Outcome::Failure(errors)) => self.notify(Notice::CreateFailed {
                errors: errors.clone(),
            }),
            Err(e) => self.notify(Notice::CreateFailed {
                errors: vec![e.clone()],
            }),
        }
        let _ = respond.send(result);
    }

    fn teardown(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.timer.abort();
        }
        // Queued deletes still go out; their reports are dropped.
        let queued: Vec<(String, QueuedDelete)> = self.queued.drain().collect();
        for (id, queued) in queued {
            self.dispatch_delete(id, queued.seq, queued.snapshot);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Create board routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_board))
        .route("/reload", post(reload_board))
        .route("/todos", post(create_on_board))
        .route("/todos/:id/delete", post(delete_on_board))
        .route("/todos/:id/undo", post(undo_on_board))
        .route("/stream", get(stream))
}

#[derive(Debug, Serialize)]
pub struct BoardDeleteResponse {
    pub result: DeleteRequest,
}

#[derive(Debug, Serialize)]
pub struct BoardUndoResponse {
    pub restored: bool,
}

fn unavailable(e: BoardError) -> (StatusCode, String) {
    match e {
        BoardError::Closed => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        BoardError::Action(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// GET /api/board
async fn get_board(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BoardSnapshot>, (StatusCode, String)> {
    state.board.snapshot().await.map(Json).map_err(unavailable)
}

/// POST /api/board/reload
async fn reload_board(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BoardSnapshot>, (StatusCode, String)> {
    state.board.load().await.map_err(unavailable)?;
    state.board.snapshot().await.map(Json).map_err(unavailable)
}

/// POST /api/board/todos
async fn create_on_board(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Outcome<Todo>>), (StatusCode, String)> {
    let outcome = state
        .board
        .request_create(&req.description())
        .await
        .map_err(unavailable)?;
    let status = if outcome.is_success() {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(outcome)))
}

/// POST /api/board/todos/:id/delete
async fn delete_on_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BoardDeleteResponse>, (StatusCode, String)> {
    let id = sanitize_str(&id);
    let snapshot = state.board.snapshot().await.map_err(unavailable)?;
    let todo = match snapshot.todos.into_iter().find(|t| t.id == id) {
        Some(todo) => todo,
        None if snapshot.pending.contains(&id) => {
            return Ok(Json(BoardDeleteResponse {
                result: DeleteRequest::AlreadyPending,
            }))
        }
        None => {
            return Err((
                StatusCode::NOT_FOUND,
                format!("Todo {} is not on the board", id),
            ))
        }
    };
    let result = state
        .board
        .request_delete(todo)
        .await
        .map_err(unavailable)?;
    Ok(Json(BoardDeleteResponse { result }))
}

/// POST /api/board/todos/:id/undo
async fn undo_on_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BoardUndoResponse>, (StatusCode, String)> {
    let restored = state
        .board
        .cancel_deletion(&id)
        .await
        .map_err(unavailable)?;
    Ok(Json(BoardUndoResponse { restored }))
}

/// GET /api/board/stream - notices as server-sent events.
async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.board.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(notice) => {
                    let event = Event::default()
                        .event(notice.event_name())
                        .json_data(&notice)
                        .unwrap_or_else(|_| Event::default().comment("unserializable notice"));
                    yield Ok(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Board notice stream lagged");
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
