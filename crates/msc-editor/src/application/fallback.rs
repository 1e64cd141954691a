//! Fallback-chained hex decoding.
//!
//! Decoding user-pasted hex tries the MSC-aware endpoint first (it knows
//! about actors and message typing) and falls back to the older generic
//! ASN.1 endpoint when that fails.  The chain is data, an ordered list of
//! [`DecodeStrategy`] values, so the fallback policy is testable without
//! any transport: each strategy is attempted in order and the chain
//! short-circuits on the first success.

use tracing::debug;

use msc_core::{HexDecodeRequest, MessageDraft};

use crate::infrastructure::api::DecodeApi;

/// One way of asking the backend to decode hex bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// `POST /api/msc/decode-hex`.
    MscAware,
    /// `POST /api/asn/decode`.
    Generic,
}

impl DecodeStrategy {
    fn name(self) -> &'static str {
        match self {
            DecodeStrategy::MscAware => "msc decode-hex",
            DecodeStrategy::Generic => "generic asn decode",
        }
    }
}

/// What the whole chain produced.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// Some strategy succeeded; the decoded bytes as an addable draft.
    Decoded(MessageDraft),
    /// Every strategy failed; one reason per attempt, in attempt order.
    Failed(Vec<String>),
}

/// Ordered list of decode strategies with first-success short-circuit.
#[derive(Debug, Clone)]
pub struct DecodeChain {
    strategies: Vec<DecodeStrategy>,
}

impl Default for DecodeChain {
    fn default() -> Self {
        Self {
            strategies: vec![DecodeStrategy::MscAware, DecodeStrategy::Generic],
        }
    }
}

impl DecodeChain {
    /// Builds a chain with an explicit strategy order.
    pub fn with_strategies(strategies: Vec<DecodeStrategy>) -> Self {
        Self { strategies }
    }

    /// Runs the chain against `api`.
    ///
    /// A decode-level failure (`status: "error"`) and a transport failure
    /// are both attempt failures; the chain records the reason and moves
    /// on to the next strategy.
    pub async fn run(&self, api: &dyn DecodeApi, request: &HexDecodeRequest) -> DecodeOutcome {
        let mut reasons = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match self.attempt(*strategy, api, request).await {
                Ok(draft) => {
                    debug!(strategy = strategy.name(), "decode succeeded");
                    return DecodeOutcome::Decoded(draft);
                }
                Err(reason) => {
                    debug!(strategy = strategy.name(), reason, "decode attempt failed");
                    reasons.push(format!("{}: {reason}", strategy.name()));
                }
            }
        }

        DecodeOutcome::Failed(reasons)
    }

    async fn attempt(
        &self,
        strategy: DecodeStrategy,
        api: &dyn DecodeApi,
        request: &HexDecodeRequest,
    ) -> Result<MessageDraft, String> {
        match strategy {
            DecodeStrategy::MscAware => {
                let decoded = api.decode_hex(request.clone()).await.map_err(|e| e.to_string())?;
                if decoded.is_error() {
                    return Err(decoded
                        .error
                        .unwrap_or_else(|| "decode reported an error".to_string()));
                }
                Ok(MessageDraft {
                    type_name: decoded.type_name,
                    data: Some(decoded.data),
                    source_actor: non_empty(decoded.source_actor)
                        .or_else(|| Some(request.source_actor.clone())),
                    target_actor: non_empty(decoded.target_actor)
                        .or_else(|| Some(request.target_actor.clone())),
                })
            }
            DecodeStrategy::Generic => {
                let decoded = api
                    .decode_generic(request.clone())
                    .await
                    .map_err(|e| e.to_string())?;
                if !decoded.is_success() {
                    return Err(decoded
                        .error
                        .unwrap_or_else(|| "decode reported an error".to_string()));
                }
                let type_name = decoded
                    .decoded_type
                    .ok_or_else(|| "decode succeeded without a type".to_string())?;
                Ok(MessageDraft {
                    type_name,
                    data: Some(decoded.data),
                    source_actor: Some(request.source_actor.clone()),
                    target_actor: Some(request.target_actor.clone()),
                })
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api::{ApiError, MockDecodeApi};
    use msc_core::{DecodedMessage, GenericDecode};
    use serde_json::json;

    fn request() -> HexDecodeRequest {
        HexDecodeRequest::new("0a1b2c", "rrc_demo")
    }

    fn decoded_ok() -> DecodedMessage {
        DecodedMessage {
            type_name: "RRCSetupRequest".to_string(),
            data: json!({"a": 1}),
            hex: "0a1b2c".to_string(),
            status: "success".to_string(),
            error: None,
            source_actor: "UE".to_string(),
            target_actor: "gNB".to_string(),
        }
    }

    fn decoded_error() -> DecodedMessage {
        DecodedMessage {
            type_name: String::new(),
            data: json!(null),
            hex: "0a1b2c".to_string(),
            status: "error".to_string(),
            error: Some("PER decode failed".to_string()),
            source_actor: String::new(),
            target_actor: String::new(),
        }
    }

    #[tokio::test]
    async fn test_first_strategy_success_short_circuits() {
        let mut api = MockDecodeApi::new();
        api.expect_decode_hex()
            .times(1)
            .returning(|_| Ok(decoded_ok()));
        // The generic endpoint must never be consulted.
        api.expect_decode_generic().times(0);

        let outcome = DecodeChain::default().run(&api, &request()).await;
        match outcome {
            DecodeOutcome::Decoded(draft) => {
                assert_eq!(draft.type_name, "RRCSetupRequest");
                assert_eq!(draft.data, Some(json!({"a": 1})));
            }
            DecodeOutcome::Failed(reasons) => panic!("expected success, got {reasons:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_generic() {
        let mut api = MockDecodeApi::new();
        api.expect_decode_hex()
            .times(1)
            .returning(|_| Ok(decoded_error()));
        api.expect_decode_generic().times(1).returning(|_| {
            Ok(GenericDecode {
                status: "success".to_string(),
                decoded_type: Some("RRCSetup".to_string()),
                data: json!({"b": 2}),
                error: None,
            })
        });

        let outcome = DecodeChain::default().run(&api, &request()).await;
        match outcome {
            DecodeOutcome::Decoded(draft) => {
                assert_eq!(draft.type_name, "RRCSetup");
                // The generic endpoint knows nothing about actors, so the
                // request defaults apply.
                assert_eq!(draft.source_actor.as_deref(), Some("UE"));
            }
            DecodeOutcome::Failed(reasons) => panic!("expected fallback success, got {reasons:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_also_falls_back() {
        let mut api = MockDecodeApi::new();
        api.expect_decode_hex().times(1).returning(|_| {
            Err(ApiError::Backend {
                status: 500,
                message: "boom".to_string(),
            })
        });
        api.expect_decode_generic().times(1).returning(|_| {
            Ok(GenericDecode {
                status: "success".to_string(),
                decoded_type: Some("X".to_string()),
                data: json!({}),
                error: None,
            })
        });

        let outcome = DecodeChain::default().run(&api, &request()).await;
        assert!(matches!(outcome, DecodeOutcome::Decoded(_)));
    }

    #[tokio::test]
    async fn test_all_failures_reported_in_attempt_order() {
        let mut api = MockDecodeApi::new();
        api.expect_decode_hex()
            .times(1)
            .returning(|_| Ok(decoded_error()));
        api.expect_decode_generic().times(1).returning(|_| {
            Ok(GenericDecode {
                status: "error".to_string(),
                decoded_type: None,
                data: json!(null),
                error: Some("unknown bytes".to_string()),
            })
        });

        let outcome = DecodeChain::default().run(&api, &request()).await;
        match outcome {
            DecodeOutcome::Failed(reasons) => {
                assert_eq!(reasons.len(), 2);
                assert!(reasons[0].contains("PER decode failed"));
                assert!(reasons[1].contains("unknown bytes"));
            }
            DecodeOutcome::Decoded(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_custom_chain_order_is_honored() {
        let mut api = MockDecodeApi::new();
        api.expect_decode_hex().times(0);
        api.expect_decode_generic().times(1).returning(|_| {
            Ok(GenericDecode {
                status: "success".to_string(),
                decoded_type: Some("X".to_string()),
                data: json!({}),
                error: None,
            })
        });

        let chain = DecodeChain::with_strategies(vec![DecodeStrategy::Generic]);
        let outcome = chain.run(&api, &request()).await;
        assert!(matches!(outcome, DecodeOutcome::Decoded(_)));
    }
}
