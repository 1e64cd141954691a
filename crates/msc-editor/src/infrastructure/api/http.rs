//! `reqwest`-based implementation of the backend API traits.
//!
//! All MSC routes live under `{base}/api/msc/...`; the generic decode
//! fallback is the older `{base}/api/asn/decode` route.  Non-success
//! statuses are mapped to [`ApiError::Backend`] with the response body as
//! the message, except for the 404s the trait contract turns into `None`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument};

use msc_core::{
    CreateSequenceRequest, DecodedMessage, GenericDecode, HexDecodeRequest, IdentifierDetection,
    IdentifierSuggestion, MessagePayload, Sequence, SequencePatch, ValidationReport,
};

use super::{ApiError, DecodeApi, SequenceApi};

/// HTTP client for the remote ASN.1/MSC backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for the backend at `base_url` (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Maps a non-success response to [`ApiError::Backend`].
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SequenceApi for HttpBackend {
    #[instrument(skip(self, request), fields(name = %request.name, protocol = %request.protocol))]
    async fn create_sequence(&self, request: CreateSequenceRequest) -> Result<Sequence, ApiError> {
        let response = self
            .client
            .post(self.url("/api/msc/sequences"))
            .json(&request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn get_sequence(&self, id: &str) -> Result<Option<Sequence>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/msc/sequences/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(id, "sequence not found on backend");
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    #[instrument(skip(self, patch))]
    async fn update_sequence(
        &self,
        id: &str,
        patch: SequencePatch,
    ) -> Result<Option<Sequence>, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/msc/sequences/{id}")))
            .json(&patch)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(id, "update target vanished on backend");
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    #[instrument(skip(self, payload), fields(type_name = %payload.type_name))]
    async fn add_message(
        &self,
        id: &str,
        payload: MessagePayload,
    ) -> Result<Option<Sequence>, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/msc/sequences/{id}/messages")))
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(id, "add-message target vanished on backend");
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    #[instrument(skip(self))]
    async fn delete_sequence(&self, id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/msc/sequences/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn list_sequences(
        &self,
        protocol: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Vec<Sequence>, ApiError> {
        let mut request = self.client.get(self.url("/api/msc/sequences"));
        if let Some(protocol) = protocol {
            request = request.query(&[("protocol", protocol)]);
        }
        if let Some(session_id) = session_id {
            request = request.query(&[("session_id", session_id)]);
        }
        let response = request.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn validate_sequence(&self, id: &str) -> Result<ValidationReport, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/msc/sequences/{id}/validate")))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn field_suggestions(
        &self,
        id: &str,
        message_index: usize,
        field_name: &str,
        protocol: &str,
        type_name: &str,
    ) -> Result<Vec<IdentifierSuggestion>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/msc/sequences/{id}/suggestions")))
            .query(&[
                ("message_index", message_index.to_string().as_str()),
                ("field_name", field_name),
                ("protocol", protocol),
                ("type_name", type_name),
            ])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn detect_identifiers(
        &self,
        protocol: &str,
        type_name: &str,
    ) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!(
                "/api/msc/protocols/{protocol}/identifiers/{type_name}"
            )))
            .send()
            .await?;
        let detection: IdentifierDetection = Self::check(response).await?.json().await?;
        Ok(detection.identifiers)
    }
}

#[async_trait]
impl DecodeApi for HttpBackend {
    #[instrument(skip(self, request), fields(protocol = %request.protocol))]
    async fn decode_hex(&self, request: HexDecodeRequest) -> Result<DecodedMessage, ApiError> {
        let response = self
            .client
            .post(self.url("/api/msc/decode-hex"))
            .json(&request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self, request), fields(protocol = %request.protocol))]
    async fn decode_generic(&self, request: HexDecodeRequest) -> Result<GenericDecode, ApiError> {
        let response = self
            .client
            .post(self.url("/api/asn/decode"))
            .json(&request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(
            backend.url("/api/msc/sequences"),
            "http://localhost:8000/api/msc/sequences"
        );
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::Backend {
            status: 404,
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Backend {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
