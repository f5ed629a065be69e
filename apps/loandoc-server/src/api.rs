//! API handlers for the loan document server
//!
//! Provides REST endpoints for:
//! - Comparing two uploaded agreement versions
//! - Comparing two already-decoded texts
//! - Listing the ESG rule battery

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use loandoc_engine::rules::ESG_RULES;
use loandoc_engine::LoanAnalysisEngine;
use serde::{Deserialize, Serialize};
use shared_pdf::{decode_document, DecodeError};
use shared_types::AnalysisResult;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Multipart part holding the baseline document
pub const BASELINE_PART: &str = "doc_v1";
/// Multipart part holding the revised document
pub const REVISED_PART: &str = "doc_v2";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "loandoc-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// ESG rule list response
#[derive(Serialize)]
pub struct EsgRulesResponse {
    pub success: bool,
    pub rules: Vec<EsgRuleInfo>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct EsgRuleInfo {
    pub name: String,
    pub comment: String,
    pub triggers: Vec<String>,
}

/// Handler: GET /api/esg-rules
pub async fn handle_list_esg_rules() -> Json<EsgRulesResponse> {
    let rules: Vec<EsgRuleInfo> = ESG_RULES
        .iter()
        .map(|rule| EsgRuleInfo {
            name: rule.name.to_string(),
            comment: rule.comment.to_string(),
            triggers: rule.triggers.iter().map(|t| t.to_string()).collect(),
        })
        .collect();

    let count = rules.len();

    Json(EsgRulesResponse {
        success: true,
        rules,
        count,
    })
}

/// Text comparison request body
#[derive(Deserialize)]
pub struct AnalyzeTextRequest {
    /// Baseline document text
    pub text_v1: String,
    /// Revised document text
    pub text_v2: String,
}

/// Handler: POST /api/analyze/text
pub async fn handle_analyze_text(Json(req): Json<AnalyzeTextRequest>) -> Json<AnalysisResult> {
    info!(
        "Text analysis request: v1={} bytes, v2={} bytes",
        req.text_v1.len(),
        req.text_v2.len()
    );

    Json(LoanAnalysisEngine::new().analyze(&req.text_v1, &req.text_v2))
}

/// One uploaded file from the multipart form
struct Upload {
    data: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

/// Handler: POST /api/analyze
///
/// Expects a multipart form with the baseline agreement in `doc_v1` and the
/// revised agreement in `doc_v2`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, ServerError> {
    let mut baseline = None;
    let mut revised = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
            .to_vec();

        let upload = Upload {
            data,
            file_name,
            content_type,
        };

        match name.as_str() {
            BASELINE_PART => baseline = Some(upload),
            REVISED_PART => revised = Some(upload),
            other => debug!("Ignoring unexpected form part '{}'", other),
        }
    }

    let baseline = baseline.ok_or(ServerError::MissingDocument(BASELINE_PART))?;
    let revised = revised.ok_or(ServerError::MissingDocument(REVISED_PART))?;

    info!(
        "Upload analysis request: {}={} bytes, {}={} bytes",
        BASELINE_PART,
        baseline.data.len(),
        REVISED_PART,
        revised.data.len()
    );

    let (text_v1, text_v2) = tokio::try_join!(
        decode_upload(
            baseline,
            BASELINE_PART,
            state.decode_permits.clone(),
            state.decode_timeout_ms
        ),
        decode_upload(
            revised,
            REVISED_PART,
            state.decode_permits.clone(),
            state.decode_timeout_ms
        ),
    )?;

    Ok(Json(LoanAnalysisEngine::new().analyze(&text_v1, &text_v2)))
}

/// Decode one upload on the blocking pool, bounded by `timeout_ms`.
///
/// A blocking task cannot be cancelled, so a decode that outlives the timeout
/// keeps running in the background. It holds one of `permits` until it
/// finishes, which caps how many runaway parses can pile up. Waiting for a
/// permit counts against the same timeout.
async fn decode_upload(
    upload: Upload,
    part: &'static str,
    permits: Arc<Semaphore>,
    timeout_ms: u64,
) -> Result<String, ServerError> {
    let decode = async move {
        let permit = permits
            .acquire_owned()
            .await
            .map_err(|e| ServerError::Internal(format!("decode pool closed: {}", e)))?;

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            decode_document(
                &upload.data,
                upload.file_name.as_deref(),
                upload.content_type.as_deref(),
            )
        });

        Ok::<_, ServerError>(task.await)
    };

    let joined = tokio::time::timeout(Duration::from_millis(timeout_ms), decode)
        .await
        .map_err(|_| {
            warn!("Decoding {} timed out after {}ms", part, timeout_ms);
            ServerError::Timeout(timeout_ms)
        })??;

    let decoded = match joined {
        Ok(decoded) => decoded,
        // pdf-extract panics on some malformed files
        Err(e) if e.is_panic() => {
            warn!("PDF parser panicked while decoding {}", part);
            Err(DecodeError::InvalidPdf("parser failed on this file".to_string()))
        }
        Err(e) => return Err(ServerError::Internal(format!("decode task failed: {}", e))),
    };

    decoded.map_err(|source| ServerError::Decode { part, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "loandoc-server");
    }

    #[tokio::test]
    async fn test_list_esg_rules() {
        let response = handle_list_esg_rules().await;
        assert!(response.success);
        assert_eq!(response.count, 5);
        assert_eq!(response.rules[0].name, "Use of proceeds clearly defined");
        assert!(response.rules[2].triggers.contains(&"kpi".to_string()));
    }

    #[tokio::test]
    async fn test_decode_upload_maps_errors_to_part() {
        let upload = Upload {
            data: Vec::new(),
            file_name: Some("v2.pdf".to_string()),
            content_type: None,
        };
        let permits = Arc::new(Semaphore::new(1));
        let err = decode_upload(upload, REVISED_PART, permits.clone(), 1_000)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Decode {
                part: REVISED_PART,
                source: DecodeError::Empty
            }
        ));
        assert_eq!(permits.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_decode_upload_times_out_waiting_for_a_permit() {
        let permits = Arc::new(Semaphore::new(1));
        let _busy = permits.clone().acquire_owned().await.unwrap();

        let upload = Upload {
            data: b"Borrower: Acme plc".to_vec(),
            file_name: Some("v1.txt".to_string()),
            content_type: Some("text/plain".to_string()),
        };
        let err = decode_upload(upload, BASELINE_PART, permits.clone(), 50)
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::Timeout(50)));
        assert_eq!(permits.available_permits(), 0);
    }

    #[tokio::test]
    async fn test_decode_upload_releases_permit_when_done() {
        let permits = Arc::new(Semaphore::new(1));
        let upload = Upload {
            data: b"Borrower: Acme plc".to_vec(),
            file_name: Some("v1.txt".to_string()),
            content_type: Some("text/plain".to_string()),
        };

        let text = decode_upload(upload, BASELINE_PART, permits.clone(), 1_000)
            .await
            .unwrap();

        assert_eq!(text, "Borrower: Acme plc");
        assert_eq!(permits.available_permits(), 1);
    }
}
