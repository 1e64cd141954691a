//! Sequence export and import.
//!
//! Export produces a self-contained JSON document a user can save to disk
//! and share; import parses such a document back into a [`Sequence`].
//! Import is deliberately forgiving about casing (both `typeName` and
//! `type_name` are accepted) and about optional metadata such as
//! `exportedAt`, but strict about structure: a document without an id,
//! a protocol, a messages array, or a non-empty name (import re-creates
//! the sequence under that name) is rejected with a message naming the
//! missing part.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::sequence::{Message, Sequence, ValidationResult};

/// Why an import document was rejected.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The document is not JSON at all.
    #[error("import is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),
    /// The document is JSON but not a sequence export.
    #[error("import has invalid format: {0}")]
    InvalidFormat(String),
}

/// A self-contained exported sequence document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceExport {
    pub id: String,
    pub name: String,
    pub protocol: String,
    pub messages: Vec<MessageExport>,
    #[serde(default)]
    pub validation_results: Vec<ValidationResult>,
    /// When the export was produced, RFC 3339.  Optional on import:
    /// hand-authored documents routinely omit it and it is discarded
    /// anyway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// One message within an export document.
///
/// The in-memory epoch-seconds timestamp is rendered as an RFC 3339
/// string so exported files are readable without a converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageExport {
    pub id: String,
    #[serde(alias = "type_name")]
    pub type_name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, alias = "source_actor")]
    pub source_actor: String,
    #[serde(default, alias = "target_actor")]
    pub target_actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Builds an export document from the current sequence state.
pub fn export_sequence(sequence: &Sequence) -> SequenceExport {
    SequenceExport {
        id: sequence.id.clone(),
        name: sequence.name.clone(),
        protocol: sequence.protocol.clone(),
        messages: sequence.messages.iter().map(export_message).collect(),
        validation_results: sequence.validation_results.clone(),
        exported_at: Some(Utc::now()),
    }
}

fn export_message(message: &Message) -> MessageExport {
    MessageExport {
        id: message.id.clone(),
        type_name: message.type_name.clone(),
        data: message.data.clone(),
        source_actor: message.source_actor.clone(),
        target_actor: message.target_actor.clone(),
        timestamp: epoch_to_rfc3339(message.timestamp),
    }
}

fn epoch_to_rfc3339(seconds: f64) -> Option<String> {
    if seconds <= 0.0 {
        return None;
    }
    let secs = seconds.trunc() as i64;
    let nanos = (seconds.fract() * 1e9) as u32;
    Utc.timestamp_opt(secs, nanos)
        .single()
        .map(|ts| ts.to_rfc3339())
}

/// Parses an import document into a sequence.
///
/// The structural check runs before the typed deserialize so the error
/// names the first missing or mistyped part instead of surfacing a serde
/// path.
pub fn parse_import(raw: &str) -> Result<Sequence, TransferError> {
    let value: Value = serde_json::from_str(raw)?;
    check_shape(&value)?;

    let export: SequenceExport = serde_json::from_value(value)
        .map_err(|e| TransferError::InvalidFormat(e.to_string()))?;

    Ok(Sequence {
        id: export.id,
        name: export.name,
        protocol: export.protocol,
        session_id: None,
        messages: export.messages.into_iter().map(import_message).collect(),
        sub_sequences: Vec::new(),
        configurations: Default::default(),
        validation_results: export.validation_results,
        created_at: None,
        updated_at: None,
    })
}

fn import_message(export: MessageExport) -> Message {
    let timestamp = export
        .timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.timestamp() as f64 + f64::from(ts.timestamp_subsec_nanos()) / 1e9)
        .unwrap_or(0.0);
    Message {
        id: export.id,
        type_name: export.type_name,
        data: export.data,
        source_actor: pick_actor(export.source_actor, crate::domain::sequence::DEFAULT_SOURCE_ACTOR),
        target_actor: pick_actor(export.target_actor, crate::domain::sequence::DEFAULT_TARGET_ACTOR),
        timestamp,
        validation_errors: Vec::new(),
    }
}

fn pick_actor(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn check_shape(value: &Value) -> Result<(), TransferError> {
    let object = value
        .as_object()
        .ok_or_else(|| TransferError::InvalidFormat("document is not an object".to_string()))?;

    for field in ["id", "name", "protocol"] {
        match object.get(field) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(_) => {
                return Err(TransferError::InvalidFormat(format!(
                    "field `{field}` must be a non-empty string"
                )))
            }
            None => {
                return Err(TransferError::InvalidFormat(format!(
                    "missing required field `{field}`"
                )))
            }
        }
    }

    match object.get("messages") {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(TransferError::InvalidFormat(
            "field `messages` must be an array".to_string(),
        )),
        None => Err(TransferError::InvalidFormat(
            "missing required field `messages`".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sequence::{DEFAULT_SOURCE_ACTOR, DEFAULT_TARGET_ACTOR};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn sample_sequence() -> Sequence {
        Sequence {
            id: "seq-1".to_string(),
            name: "Attach".to_string(),
            protocol: "rrc_demo".to_string(),
            session_id: None,
            messages: vec![Message {
                id: "msg-1".to_string(),
                type_name: "RRCSetupRequest".to_string(),
                data: json!({"ue-Identity": "0101"}),
                source_actor: DEFAULT_SOURCE_ACTOR.to_string(),
                target_actor: DEFAULT_TARGET_ACTOR.to_string(),
                timestamp: 1700000000.0,
                validation_errors: Vec::new(),
            }],
            sub_sequences: Vec::new(),
            configurations: BTreeMap::new(),
            validation_results: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_export_renders_epoch_timestamp_as_rfc3339() {
        let export = export_sequence(&sample_sequence());
        let ts = export.messages[0].timestamp.as_deref().unwrap();
        assert!(ts.starts_with("2023-11-14T"), "unexpected timestamp {ts}");
    }

    #[test]
    fn test_export_omits_timestamp_for_untimed_messages() {
        let mut seq = sample_sequence();
        seq.messages[0].timestamp = 0.0;
        let export = export_sequence(&seq);
        assert!(export.messages[0].timestamp.is_none());
    }

    #[test]
    fn test_exported_document_imports_back() {
        let original = sample_sequence();
        let raw = serde_json::to_string(&export_sequence(&original)).unwrap();

        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.id, original.id);
        assert_eq!(imported.messages.len(), 1);
        assert_eq!(imported.messages[0].type_name, "RRCSetupRequest");
        assert!((imported.messages[0].timestamp - 1700000000.0).abs() < 1.0);
    }

    #[test]
    fn test_import_accepts_snake_case_aliases() {
        let raw = json!({
            "id": "seq-2",
            "name": "N",
            "protocol": "p",
            "messages": [{
                "id": "m1",
                "type_name": "X",
                "data": {},
                "source_actor": "gNB",
                "target_actor": "UE",
            }],
            "exportedAt": "2024-06-01T10:00:00Z",
        })
        .to_string();

        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.messages[0].source_actor, "gNB");
    }

    #[test]
    fn test_import_fills_default_actors_when_blank() {
        let raw = json!({
            "id": "seq-2",
            "name": "N",
            "protocol": "p",
            "messages": [{"id": "m1", "typeName": "X"}],
            "exportedAt": "2024-06-01T10:00:00Z",
        })
        .to_string();

        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.messages[0].source_actor, DEFAULT_SOURCE_ACTOR);
        assert_eq!(imported.messages[0].target_actor, DEFAULT_TARGET_ACTOR);
    }

    #[test]
    fn test_import_accepts_document_without_exported_at() {
        // Hand-authored documents carry only the structural fields.
        let raw = json!({
            "id": "seq-3",
            "name": "Handover",
            "protocol": "rrc_demo",
            "messages": [{"id": "m1", "typeName": "MeasurementReport"}],
        })
        .to_string();

        let imported = parse_import(&raw).unwrap();
        assert_eq!(imported.name, "Handover");
        assert_eq!(imported.messages[0].type_name, "MeasurementReport");
    }

    #[test]
    fn test_import_rejects_non_json() {
        let err = parse_import("not json at all").unwrap_err();
        assert!(matches!(err, TransferError::NotJson(_)));
    }

    #[test]
    fn test_import_names_missing_field() {
        let raw = json!({"name": "N", "protocol": "p", "messages": []}).to_string();
        let err = parse_import(&raw).unwrap_err();
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_import_rejects_non_array_messages() {
        let raw = json!({
            "id": "s", "name": "N", "protocol": "p", "messages": "oops",
        })
        .to_string();
        let err = parse_import(&raw).unwrap_err();
        assert!(err.to_string().contains("`messages`"));
    }

    #[test]
    fn test_import_rejects_non_object_document() {
        let err = parse_import("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, TransferError::InvalidFormat(_)));
    }
}
