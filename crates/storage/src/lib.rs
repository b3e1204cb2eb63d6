//! Persistence adapters for the quiz workspace.
//!
//! `repository` holds the async repository contracts and their in-memory
//! implementation, `sqlite` the `sqlx` backend, and `session_store` the
//! single durable slot used to resume an interrupted mock test.

pub mod repository;
pub mod session_store;
pub mod sqlite;

pub use repository::{AttemptRow, Storage, StorageError};
pub use session_store::{FileSessionStore, InMemorySessionStore, SESSION_SLOT, SessionStore};
