//! Request and response DTOs for the sequence backend.
//!
//! Direction matters for casing: request bodies are snake_case (the
//! backend's input models take field names verbatim), while responses are
//! camelCase (every response model goes through a camelCase alias
//! generator).  The types here encode that split so call sites never have
//! to think about it.
//!
//! # Patch protocol (for beginners)
//!
//! Sequence updates go through a single PUT endpoint whose body carries
//! exactly one of four mutually exclusive operations.  [`SequencePatch`]
//! models that as an externally tagged enum, so
//! `serde_json::to_value(&SequencePatch::RemoveMessage(id))` yields
//! `{"remove_message": "..."}` and the "exactly one operation" rule holds
//! by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::sequence::{MessageDraft, ValidationResult};

// ── Requests ──────────────────────────────────────────────────────────────────

/// Body for `POST /api/msc/sequences`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSequenceRequest {
    pub name: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A fully resolved message payload, as sent to the backend.
///
/// Built from a [`MessageDraft`] with all defaults applied; the backend
/// assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub type_name: String,
    pub data: Value,
    pub source_actor: String,
    pub target_actor: String,
}

impl From<&MessageDraft> for MessagePayload {
    fn from(draft: &MessageDraft) -> Self {
        Self {
            type_name: draft.type_name.clone(),
            data: draft.data_or_default(),
            source_actor: draft.source_or_default(),
            target_actor: draft.target_or_default(),
        }
    }
}

/// One mutation for `PUT /api/msc/sequences/{id}`.
///
/// Exactly one operation per request; the serialized body is an object
/// with a single key naming the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencePatch {
    /// Renames the sequence.
    #[serde(rename = "name")]
    Rename(String),
    /// Appends a message to the end of the sequence.
    #[serde(rename = "add_message")]
    AddMessage(MessagePayload),
    /// Replaces the field data of an existing message.
    #[serde(rename = "update_message")]
    UpdateMessage { id: String, data: Value },
    /// Removes a message by id.
    #[serde(rename = "remove_message")]
    RemoveMessage(String),
}

/// Body for `POST /api/msc/decode-hex` and the generic
/// `POST /api/asn/decode` fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexDecodeRequest {
    pub hex_data: String,
    pub protocol: String,
    /// Expected type, when known; the backend otherwise tries all types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default = "default_encoding_rule")]
    pub encoding_rule: String,
    #[serde(default = "default_source_actor")]
    pub source_actor: String,
    #[serde(default = "default_target_actor")]
    pub target_actor: String,
}

impl HexDecodeRequest {
    /// Builds a PER decode request with default actors.
    pub fn new(hex_data: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            hex_data: hex_data.into(),
            protocol: protocol.into(),
            type_name: None,
            encoding_rule: default_encoding_rule(),
            source_actor: default_source_actor(),
            target_actor: default_target_actor(),
        }
    }

    /// Pins the expected message type.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

fn default_encoding_rule() -> String {
    "per".to_string()
}

fn default_source_actor() -> String {
    crate::domain::sequence::DEFAULT_SOURCE_ACTOR.to_string()
}

fn default_target_actor() -> String {
    crate::domain::sequence::DEFAULT_TARGET_ACTOR.to_string()
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// Aggregate result of `POST /api/msc/sequences/{id}/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    #[serde(default)]
    pub results: Vec<ValidationResult>,
    pub has_errors: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

impl ValidationReport {
    /// Derives the aggregate counters from a list of findings.
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let error_count = results.iter().filter(|r| r.is_error()).count();
        let warning_count = results.len() - error_count;
        Self {
            has_errors: error_count > 0,
            error_count,
            warning_count,
            results,
        }
    }
}

/// One entry from `GET /api/msc/sequences/{id}/suggestions`.
///
/// Suggests a value for an identifier field based on what earlier messages
/// in the sequence established.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierSuggestion {
    pub identifier: String,
    pub value: Value,
    /// Index of the message the value was taken from.
    pub source_message_index: usize,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of `GET /api/msc/protocols/{protocol}/identifiers/{type_name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDetection {
    #[serde(default)]
    pub identifiers: Vec<String>,
    pub protocol: String,
    pub type_name: String,
    #[serde(default)]
    pub count: usize,
}

/// Result of `POST /api/msc/decode-hex`.
///
/// A decode failure is still a 200 with `status: "error"`; callers check
/// [`DecodedMessage::is_error`] before trusting `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMessage {
    pub type_name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub hex: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub source_actor: String,
    #[serde(default)]
    pub target_actor: String,
}

impl DecodedMessage {
    /// Whether the decode attempt failed.
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// Result of the generic `POST /api/asn/decode` fallback.
///
/// Unlike the MSC-aware endpoint this one is snake_case: it predates the
/// camelCase alias generator and was never migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericDecode {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_type: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenericDecode {
    /// Whether the fallback decode succeeded with a recognized type.
    pub fn is_success(&self) -> bool {
        self.status == "success" && self.decoded_type.is_some()
    }
}
