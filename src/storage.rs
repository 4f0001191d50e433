//! Session storage.
//!
//! This module defines the key/value view an application uses to read and
//! write the data of the current session, and the registry that keeps one
//! canonical state per session id.
//!
//! # Concepts
//!
//! - **[`Storage`]**: a cheap, cloneable handle onto shared session state. Every
//!   clone is a view of the same state, so a write through one handle is visible
//!   through all of them.
//! - **Metadata**: a reserved namespace stored alongside the user keys under
//!   [`METADATA_KEY`]. It holds the request access time, validator fingerprints
//!   and key expiration counters, and is excluded from plain iteration.
//! - **Immutability**: once [`Storage::mark_immutable`] has been called (the
//!   manager does this when the session is write-closed) every mutation fails
//!   with [`SessionError::ImmutableStorage`](crate::errors::SessionError). Reads
//!   keep working.
//! - **[`StorageArena`]**: maps session ids to their canonical [`Storage`], so
//!   several managers or handles resuming the same id share one state.
//!
//! # Example
//!
//! ```rust
//! use gosub_session::storage::Storage;
//! use serde_json::json;
//!
//! let storage = Storage::new();
//! let view = storage.clone();
//!
//! storage.set_path(&["cart", "items"], json!(["apple"])).unwrap();
//! assert_eq!(view.get_path(&["cart", "items", "0"]), Some(json!("apple")));
//!
//! storage.mark_immutable();
//! assert!(view.set("late", 1).is_err());
//! assert_eq!(view.get("cart"), Some(json!({ "items": ["apple"] })));
//! ```

/// Storage handle over shared session state.
pub mod area;
/// Per-id registry of session state.
pub mod arena;
/// Reserved metadata namespace keys.
pub mod metadata;
/// Path-addressed access into nested values.
pub mod value;

pub use area::Storage;
pub use arena::StorageArena;
pub use metadata::METADATA_KEY;
pub use value::SessionValue;
