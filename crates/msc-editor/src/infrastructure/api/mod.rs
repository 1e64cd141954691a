//! Backend API seam.
//!
//! The editor never calls `reqwest` directly; it goes through the
//! [`SequenceApi`] and [`DecodeApi`] traits.  Production wires in
//! [`HttpBackend`]; tests substitute in-process fakes so the whole engine
//! runs without a network.
//!
//! # Error conventions
//!
//! A 404 on a read path is not an error here: `get_sequence` and
//! `update_sequence` resolve to `Ok(None)` so callers can treat "the
//! sequence is gone" as a distinct, normal outcome.  Everything else maps
//! to [`ApiError`].

mod http;

use async_trait::async_trait;
use thiserror::Error;

use msc_core::{
    CreateSequenceRequest, DecodedMessage, GenericDecode, HexDecodeRequest, IdentifierSuggestion,
    MessagePayload, Sequence, SequencePatch, ValidationReport,
};

pub use http::HttpBackend;

/// Error type for remote backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("network error talking to backend: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether the failure means the addressed resource no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Backend { status: 404, .. })
    }
}

/// Remote CRUD and validation surface for sequences.
#[async_trait]
pub trait SequenceApi: Send + Sync {
    /// `POST /api/msc/sequences`.
    async fn create_sequence(&self, request: CreateSequenceRequest) -> Result<Sequence, ApiError>;

    /// `GET /api/msc/sequences/{id}`; 404 resolves to `None`.
    async fn get_sequence(&self, id: &str) -> Result<Option<Sequence>, ApiError>;

    /// `PUT /api/msc/sequences/{id}` with one patch operation; 404
    /// resolves to `None`.
    async fn update_sequence(
        &self,
        id: &str,
        patch: SequencePatch,
    ) -> Result<Option<Sequence>, ApiError>;

    /// `POST /api/msc/sequences/{id}/messages`; 404 resolves to `None`.
    async fn add_message(
        &self,
        id: &str,
        payload: MessagePayload,
    ) -> Result<Option<Sequence>, ApiError>;

    /// `DELETE /api/msc/sequences/{id}`; returns whether anything was
    /// deleted.
    async fn delete_sequence(&self, id: &str) -> Result<bool, ApiError>;

    /// `GET /api/msc/sequences` with optional protocol/session filters.
    async fn list_sequences(
        &self,
        protocol: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Vec<Sequence>, ApiError>;

    /// `POST /api/msc/sequences/{id}/validate`.
    async fn validate_sequence(&self, id: &str) -> Result<ValidationReport, ApiError>;

    /// `GET /api/msc/sequences/{id}/suggestions`.
    async fn field_suggestions(
        &self,
        id: &str,
        message_index: usize,
        field_name: &str,
        protocol: &str,
        type_name: &str,
    ) -> Result<Vec<IdentifierSuggestion>, ApiError>;

    /// `GET /api/msc/protocols/{protocol}/identifiers/{type_name}`.
    async fn detect_identifiers(
        &self,
        protocol: &str,
        type_name: &str,
    ) -> Result<Vec<String>, ApiError>;
}

/// Hex decode surface, MSC-aware plus the older generic endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecodeApi: Send + Sync {
    /// `POST /api/msc/decode-hex`.
    async fn decode_hex(&self, request: HexDecodeRequest) -> Result<DecodedMessage, ApiError>;

    /// `POST /api/asn/decode` (generic fallback, snake_case response).
    async fn decode_generic(&self, request: HexDecodeRequest) -> Result<GenericDecode, ApiError>;
}
