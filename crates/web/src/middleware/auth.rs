use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::WebError;

/// Header carrying the delivery signature of a webhook batch
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

const MAX_BATCH_BYTES: usize = 10 * 1024 * 1024;

/// Decides whether a webhook batch really comes from the chat platform.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, signature: &str, body: &[u8]) -> bool;
}

/// Shared tokens configured on the gateway that forwards platform webhooks.
#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl SignatureVerifier for ApiKeys {
    fn verify(&self, signature: &str, _body: &[u8]) -> bool {
        self.is_valid(signature)
    }
}

/// Rejects the whole request unless its signature header verifies.
pub async fn require_signature(
    State(verifier): State<Arc<dyn SignatureVerifier>>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let Some(signature) = signature else {
        tracing::warn!("Webhook request without signature");
        return Err(WebError::InvalidSignature);
    };

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BATCH_BYTES)
        .await
        .map_err(|e| WebError::UnreadableBody(e.to_string()))?;

    if !verifier.verify(&signature, &bytes) {
        tracing::warn!("Invalid webhook signature attempt");
        return Err(WebError::InvalidSignature);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
