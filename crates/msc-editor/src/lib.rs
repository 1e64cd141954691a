//! Sequence edit engine for the MSC protocol exchange editor.
//!
//! This crate owns the canonical in-memory state of "the sequence being
//! edited": it applies create/add/update/remove/rename operations against
//! the remote ASN.1/MSC backend, keeps a bounded undo/redo history,
//! mirrors state to a local snapshot store so a restart resumes where the
//! user left off, and re-runs server-side validation after every mutation.
//!
//! # Architecture
//!
//! The crate follows a domain/application/infrastructure split:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ application                                         │
//! │   SequenceEditor      edit operations + history     │
//! │   optimistic          rename commit/rollback policy │
//! │   DecodeChain         decode fallback strategies    │
//! ├─────────────────────────────────────────────────────┤
//! │ infrastructure                                      │
//! │   api::HttpBackend    reqwest client for the remote │
//! │   store::SnapshotStore  local JSON snapshot files   │
//! │   store::DebouncedWriter  coalesced snapshot writes │
//! ├─────────────────────────────────────────────────────┤
//! │ domain                                              │
//! │   EditorConfig        on-disk configuration         │
//! │   (entities live in the msc-core crate)             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The editor talks to the backend only through the [`api::SequenceApi`]
//! and [`api::DecodeApi`] traits, so tests drive it with in-process fakes
//! and never open a socket.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::editor::{EditorError, EditorState, SequenceEditor};
pub use application::fallback::{DecodeChain, DecodeOutcome, DecodeStrategy};
pub use application::optimistic::{classify_commit, CommitOutcome};
pub use domain::config::EditorConfig;
pub use infrastructure::api::{ApiError, DecodeApi, HttpBackend, SequenceApi};
pub use infrastructure::store::{DebouncedWriter, SnapshotStore, StoreError};
