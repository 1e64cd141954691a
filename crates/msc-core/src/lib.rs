//! # msc-core
//!
//! Shared library for the MSC sequence editor containing the domain
//! entities, the undo/redo history ring, and the JSON wire/transfer formats.
//!
//! This crate is used by the editor engine and any future front end.
//! It has zero dependencies on sockets, the filesystem, or an async runtime.
//!
//! # Architecture overview (for beginners)
//!
//! A Message Sequence Chart (MSC) describes a protocol exchange between two
//! actors — for example RRC signalling between a "UE" (the phone) and a
//! "gNB" (the base station).  The editor lets a user build such an exchange
//! message by message while a remote ASN.1 backend validates it.
//!
//! This crate (`msc-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business state with no I/O.  The most important
//!   pieces are the `Sequence` aggregate (the ordered message exchange) and
//!   the `HistoryRing` (a bounded linear undo history of full snapshots).
//!
//! - **`protocol`** – How JSON travels to and from the backend: request
//!   bodies, the tagged sequence-patch protocol, response DTOs, and the
//!   normalized export/import transfer format.

// Declare the two top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `msc_core::Sequence` instead of `msc_core::domain::sequence::Sequence`.
pub use domain::history::HistoryRing;
pub use domain::sequence::{
    EditSignature, Message, MessageDraft, Sequence, TrackedIdentifier, ValidationKind,
    ValidationResult, DEFAULT_SOURCE_ACTOR, DEFAULT_TARGET_ACTOR,
};
pub use protocol::messages::{
    CreateSequenceRequest, DecodedMessage, GenericDecode, HexDecodeRequest, IdentifierDetection,
    IdentifierSuggestion, MessagePayload, SequencePatch, ValidationReport,
};
pub use protocol::transfer::{export_sequence, parse_import, SequenceExport, TransferError};
