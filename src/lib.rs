//! In-memory todo list API server.
//!
//! # Overview
//! A single-collection task API: CRUD over todo records plus filtering,
//! a two-key sort, and aggregate statistics. All state lives in memory
//! and is lost on restart.
//!
//! # Design
//! - `TodoStore` owns the collection and the id counter; it is plain
//!   synchronous data with no I/O.
//! - Handlers reach the store through one `Arc<RwLock<_>>` boundary, the
//!   single mutual-exclusion point required under the multi-threaded
//!   runtime.
//! - Priority strings are parsed into the `Priority` enum at the handler
//!   edge; invalid values never reach the store.
//! - Every response body carries a `success` boolean; errors map to
//!   400/404/500 via `ApiError`.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod types;

pub use error::ApiError;
pub use routes::{app, AppState};
pub use store::TodoStore;
pub use types::{CreateTodo, Priority, Stats, Task, TodoPatch, UpdateTodo};

use tokio::net::TcpListener;

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
