//! Save handler infrastructure.
//!
//! A **save handler** persists and retrieves the serialized blob of a session,
//! keyed by its session id. The manager depends only on the five operations of
//! [`SaveHandler`]; file, database or cache backends live outside this crate
//! and plug in through the same trait.
//!
//! ## Contract
//! - `open` is called once per `start()` before its `read`. `session_exists()`
//!   may also `read` without `open` to look up an id; that lookup must not mutate.
//! - `read` of an unknown id returns an **empty** blob, not an error.
//! - `write` replaces the stored blob for the id.
//! - `destroy` of an unknown id succeeds (idempotent).
//! - `gc` removes sessions untouched for longer than `max_lifetime` seconds and
//!   returns how many it removed.
//! - Implementations must be `Send + Sync` and provide at least per-id
//!   isolation between concurrent requests (locking is the backend's job).
//! - Errors are returned as-is; the manager surfaces them as
//!   [`SessionError::Backend`](crate::errors::SessionError::Backend) and never retries.
mod in_memory;

use std::sync::Arc;

use anyhow::Result;

/// In-memory save handler, shared by clones.
pub use in_memory::InMemorySaveHandler;

/// A handle to a save handler trait.
pub type SaveHandlerHandle = Arc<dyn SaveHandler + Send + Sync>;

/// Persistence backend for session blobs.
pub trait SaveHandler: Send + Sync {
    /// Prepares the backend: `save_path` is opaque configuration, `session_name` the
    /// configured session name.
    fn open(&self, save_path: &str, session_name: &str) -> Result<()>;

    /// Returns the blob stored for `id`, or an empty vector when nothing is stored.
    fn read(&self, id: &str) -> Result<Vec<u8>>;

    /// Stores `data` as the blob for `id`.
    fn write(&self, id: &str, data: &[u8]) -> Result<()>;

    /// Removes the blob for `id`.
    fn destroy(&self, id: &str) -> Result<()>;

    /// Removes every blob older than `max_lifetime` seconds.
    fn gc(&self, max_lifetime: u64) -> Result<usize>;
}
