//! HTTP API for the todo panel.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/todos?filter=all|active|deleted` - List todos
//! - `POST /api/todos` - Create a todo
//! - `PATCH /api/todos/{id}` - Update a todo
//! - `DELETE /api/todos/{id}` - Delete a todo
//! - `POST /api/todos/{id}/trash` - Soft-delete a todo
//! - `GET /api/todos/events` - Stream change events via SSE
//! - `GET /api/board` - Visible list and pending deletions
//! - `POST /api/board/reload` - Reload the board from the store
//! - `POST /api/board/todos` - Create optimistically
//! - `POST /api/board/todos/{id}/delete` - Delete with an undo window
//! - `POST /api/board/todos/{id}/undo` - Undo a pending deletion
//! - `GET /api/board/stream` - Stream board notices via SSE

pub mod board;
mod routes;
pub mod todo_store;
mod todos;
pub mod types;

pub use routes::{serve, AppState};
pub use types::*;
