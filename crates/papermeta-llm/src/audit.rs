//! Audit logging for LLM calls.
//! Every completion is timed and emitted as a structured tracing event.

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    /// Document the call was made for, when known.
    pub document_id: Option<String>,
    pub model: String,
    pub is_local: bool,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: Option<String>,
    pub error: Option<String>,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn success(
        document_id: Option<String>,
        backend: &dyn LlmBackend,
        resp: &LlmResponse,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(resp.content.as_bytes());
        let output_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            document_id,
            model: resp.model.clone(),
            is_local: backend.is_local(),
            prompt_tokens: resp.prompt_tokens,
            completion_tokens: resp.completion_tokens,
            output_hash: Some(output_hash),
            error: None,
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn failure(
        document_id: Option<String>,
        backend: &dyn LlmBackend,
        err: &LlmError,
        latency_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            model: backend.model_id().to_string(),
            is_local: backend.is_local(),
            prompt_tokens: 0,
            completion_tokens: 0,
            output_hash: None,
            error: Some(err.to_string()),
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        match &self.error {
            None => tracing::info!(
                audit_id = %self.id,
                document_id = self.document_id.as_deref().unwrap_or("-"),
                model = %self.model,
                is_local = self.is_local,
                prompt_tokens = self.prompt_tokens,
                completion_tokens = self.completion_tokens,
                output_hash = self.output_hash.as_deref().unwrap_or("-"),
                latency_ms = self.latency_ms,
                "LLM call completed"
            ),
            Some(err) => tracing::warn!(
                audit_id = %self.id,
                document_id = self.document_id.as_deref().unwrap_or("-"),
                model = %self.model,
                latency_ms = self.latency_ms,
                error = %err,
                "LLM call failed"
            ),
        }
    }
}

/// Run one completion against `backend` and emit its audit entry.
pub async fn complete_audited(
    backend: &dyn LlmBackend,
    req: LlmRequest,
    document_id: Option<&str>,
) -> Result<LlmResponse, LlmError> {
    let started = Instant::now();
    let result = backend.complete(req).await;
    let latency_ms = started.elapsed().as_millis() as u64;
    let document_id = document_id.map(str::to_string);

    let entry = match &result {
        Ok(resp) => LlmAuditEntry::success(document_id, backend, resp, latency_ms),
        Err(e)   => LlmAuditEntry::failure(document_id, backend, e, latency_ms),
    };
    entry.emit();
    result
}
