//! MSC sequence domain entities.
//!
//! A `Sequence` is the aggregate root: an ordered, named collection of
//! protocol messages exchanged between two actors, plus the tracked
//! identifier values and validation findings attached to it by the backend.
//!
//! # Persisted vs draft messages (for beginners)
//!
//! The backend is the only authority that assigns message ids.  A message
//! the user has typed but not yet sent therefore has *no* id.  Instead of
//! modelling that as an `Option<String>` id (and checking it everywhere),
//! the un-persisted form is a separate type, [`MessageDraft`].  The type
//! system then guarantees that an id-less message can never end up inside
//! `Sequence::messages`.
//!
//! # Serde representation
//!
//! All response DTO fields are camelCase on the wire (`typeName`,
//! `sourceActor`, `messageIndex`, …) because the backend runs every
//! response model through a camelCase alias generator.  Timestamps on the
//! sequence (`createdAt` / `updatedAt`) are parsed leniently: the backend
//! has historically emitted both RFC 3339 and naive `isoformat()` strings,
//! and a snapshot restored from local storage must survive either.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default source actor for a new message.
pub const DEFAULT_SOURCE_ACTOR: &str = "UE";
/// Default target actor for a new message.
pub const DEFAULT_TARGET_ACTOR: &str = "gNB";

// ── Validation results ────────────────────────────────────────────────────────

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Error,
    Warning,
}

/// A structured finding produced by server-side semantic checking.
///
/// The engine never synthesizes these locally; it only stores, clears, and
/// displays what the validate endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Severity — the wire field is literally named `type`.
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    /// Human-readable description of the finding.
    pub message: String,
    /// Field path the finding refers to, when it is field-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Index into the owning sequence's messages, when message-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_index: Option<usize>,
    /// Machine-readable code (e.g. `INVALID_TRANSITION`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ValidationResult {
    /// Returns `true` for error-severity findings.
    pub fn is_error(&self) -> bool {
        self.kind == ValidationKind::Error
    }
}

// ── Tracked identifiers ───────────────────────────────────────────────────────

/// Value history of one tracked identifier across the sequence.
///
/// The backend extracts identifier fields (e.g. `rrc-TransactionIdentifier`)
/// from each message and records which value appeared at which message
/// index.  Inconsistent values across messages are a validation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedIdentifier {
    /// Identifier field name.
    pub name: String,
    /// message index → observed value.
    #[serde(default)]
    pub values: BTreeMap<usize, Value>,
    /// Whether all observed values agree (as reported by the backend).
    #[serde(default = "default_true")]
    pub is_consistent: bool,
    /// Human-readable conflict descriptions.
    #[serde(default)]
    pub conflicts: Vec<String>,
}

impl TrackedIdentifier {
    /// Recomputes consistency from the recorded values.
    ///
    /// An identifier with zero or one recorded value is trivially
    /// consistent.
    pub fn values_agree(&self) -> bool {
        let mut iter = self.values.values();
        match iter.next() {
            None => true,
            Some(first) => iter.all(|v| v == first),
        }
    }
}

fn default_true() -> bool {
    true
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// One persisted protocol message within a sequence.
///
/// Invariant: `id` was assigned by the backend.  A message belongs to
/// exactly one `Sequence::messages` list; snapshots clone it by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Backend-assigned identifier, stable for the message's lifetime.
    pub id: String,
    /// Protocol message type (e.g. `RRCSetupRequest`).
    pub type_name: String,
    /// Decoded/edited field tree for the message.
    #[serde(default = "empty_object")]
    pub data: Value,
    /// Actor sending the message.
    #[serde(default = "default_source_actor")]
    pub source_actor: String,
    /// Actor receiving the message.
    #[serde(default = "default_target_actor")]
    pub target_actor: String,
    /// Seconds since epoch when the message was added.
    #[serde(default)]
    pub timestamp: f64,
    /// Per-message findings from the last validation pass.
    #[serde(default)]
    pub validation_errors: Vec<ValidationResult>,
}

/// A message the user has composed but not yet persisted.
///
/// Only `type_name` is required; missing actors and data are filled with
/// the `"UE"` → `"gNB"` defaults and an empty object when the draft is
/// turned into a request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDraft {
    pub type_name: String,
    pub data: Option<Value>,
    pub source_actor: Option<String>,
    pub target_actor: Option<String>,
}

impl MessageDraft {
    /// Creates a draft with only the type name set.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Sets the field data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the sending actor.
    pub fn from_actor(mut self, actor: impl Into<String>) -> Self {
        self.source_actor = Some(actor.into());
        self
    }

    /// Sets the receiving actor.
    pub fn to_actor(mut self, actor: impl Into<String>) -> Self {
        self.target_actor = Some(actor.into());
        self
    }

    /// Resolves the draft's data, falling back to an empty object.
    pub fn data_or_default(&self) -> Value {
        self.data.clone().unwrap_or_else(empty_object)
    }

    /// Resolves the sending actor, falling back to [`DEFAULT_SOURCE_ACTOR`].
    pub fn source_or_default(&self) -> String {
        self.source_actor
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE_ACTOR.to_string())
    }

    /// Resolves the receiving actor, falling back to [`DEFAULT_TARGET_ACTOR`].
    pub fn target_or_default(&self) -> String {
        self.target_actor
            .clone()
            .unwrap_or_else(|| DEFAULT_TARGET_ACTOR.to_string())
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn default_source_actor() -> String {
    DEFAULT_SOURCE_ACTOR.to_string()
}

fn default_target_actor() -> String {
    DEFAULT_TARGET_ACTOR.to_string()
}

// ── Sequence aggregate ────────────────────────────────────────────────────────

/// An ordered, named collection of protocol messages between two actors.
///
/// `id` is backend-assigned and stable for the sequence's lifetime.
/// `messages` order is significant: it is the temporal order of the
/// exchange.  `protocol` is immutable in practice — switching protocols
/// means creating a new sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub id: String,
    pub name: String,
    pub protocol: String,
    /// Session the sequence belongs to, used as an opaque list filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Nested sub-sequences.  Carried opaquely; the editor never mutates
    /// them.
    #[serde(default)]
    pub sub_sequences: Vec<Value>,
    /// Tracked identifier histories, keyed by identifier name.
    #[serde(default)]
    pub configurations: BTreeMap<String, TrackedIdentifier>,
    /// Findings from the last validation pass over the whole sequence.
    #[serde(default)]
    pub validation_results: Vec<ValidationResult>,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sequence {
    /// Finds the position of a message by id.
    pub fn message_index(&self, message_id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }

    /// Finds a message by id.
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Computes the edit signature used to decide whether a state
    /// transition warrants a new history snapshot.
    ///
    /// The signature covers the sequence id and the (id, type) projection
    /// of the message list — field-level edits inside a message do *not*
    /// change it, so they do not spam the undo history.
    pub fn edit_signature(&self) -> EditSignature {
        EditSignature {
            sequence_id: self.id.clone(),
            messages: self
                .messages
                .iter()
                .map(|m| (m.id.clone(), m.type_name.clone()))
                .collect(),
        }
    }
}

/// Identity of a sequence's message structure for history purposes.
///
/// Two sequences with the same signature differ at most in message field
/// data, names, or validation state — none of which create an undo point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSignature {
    pub sequence_id: String,
    pub messages: Vec<(String, String)>,
}

// ── Lenient timestamp (de)serialization ──────────────────────────────────────

/// Accepts RFC 3339 (`2024-01-01T12:00:00Z`), naive isoformat
/// (`2024-01-01T12:00:00.123456`), and space-separated
/// (`2024-01-01 12:00:00.123456`) timestamp strings.  Anything else — or a
/// missing/null field — deserializes to `None` rather than failing the
/// whole snapshot.
mod lenient_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        tracing::warn!(raw, "unparseable timestamp in sequence payload, dropping");
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
