//! # Todo Panel
//!
//! Task list service with an optimistic delete/undo board.
//!
//! This library provides:
//! - A todo domain with sanitized, validated descriptions
//! - SQLite and in-memory stores behind one async trait
//! - HTTP APIs for CRUD and for the optimistic board
//! - Streaming change events and board notices over SSE
//!
//! ## Delete Flow (board)
//! 1. Task is hidden immediately and a "deleted" notice offers undo
//! 2. The store delete runs in the background
//! 3. Undo within the window shows the task again
//! 4. A failed delete brings the task back with an error notice
//!
//! ## Modules
//! - `todo`: record types, validation, use cases and actions
//! - `api`: stores, board actor and HTTP routes
//! - `config`: environment-driven configuration

pub mod api;
pub mod config;
pub mod todo;
pub mod util;

pub use api::board::{BoardHandle, Notice};
pub use config::Config;
pub use todo::{Outcome, Todo, TodoActions};
