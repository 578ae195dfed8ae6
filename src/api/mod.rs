//! HTTP front for the triage engine.
//!
//! `POST /analyze` accepts JSON `{"text": ...}`, a urlencoded form field
//! `text`, or multipart with `text` and/or a `file` upload. `GET /health`
//! reports 503 while no API key is configured.

use crate::core::engine::TriageEngine;
use crate::domain::model::{RawInput, UploadedDocument};
use crate::domain::ports::Pipeline;
use crate::utils::error::TriageError;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Debug, Default, Deserialize)]
struct TextPayload {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    credential_configured: bool,
    model: String,
}

pub fn router<P: Pipeline + 'static>(engine: Arc<TriageEngine<P>>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/analyze", post(analyze::<P>))
        .route("/health", get(health::<P>))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

async fn health<P: Pipeline + 'static>(State(engine): State<Arc<TriageEngine<P>>>) -> Response {
    let report = engine.health();
    let (status_code, status) = if report.credential_configured {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            credential_configured: report.credential_configured,
            model: report.model,
        }),
    )
        .into_response()
}

async fn analyze<P: Pipeline + 'static>(
    State(engine): State<Arc<TriageEngine<P>>>,
    request: Request,
) -> Response {
    let input = match read_input(request).await {
        Ok(input) => input,
        Err(response) => return response,
    };

    match engine.handle(input).await {
        Ok(envelope) => {
            tracing::info!("✅ Analyze request completed");
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// 依 Content-Type 選擇解析方式；其他類型視為沒有輸入
async fn read_input(request: Request) -> Result<RawInput, Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(payload) = Json::<TextPayload>::from_request(request, &())
            .await
            .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))?;
        return Ok(RawInput {
            json_text: payload.text,
            ..RawInput::default()
        });
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(payload) = Form::<TextPayload>::from_request(request, &())
            .await
            .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))?;
        return Ok(RawInput {
            form_text: payload.text,
            ..RawInput::default()
        });
    }

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))?;
        return read_multipart(multipart).await;
    }

    tracing::debug!("Unrecognized content type {:?}, treating as empty", content_type);
    Ok(RawInput::default())
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawInput, Response> {
    let mut input = RawInput::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(rejection_response(e.status(), e.body_text())),
        };

        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| rejection_response(e.status(), e.body_text()))?;
                input.form_text = Some(text);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejection_response(e.status(), e.body_text()))?;
                tracing::debug!("📎 Received upload ({} bytes)", bytes.len());
                input.document = Some(UploadedDocument {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(input)
}

fn rejection_response(status: StatusCode, message: String) -> Response {
    tracing::warn!("⚠️ Rejected request body ({}): {}", status, message);
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn error_response(error: &TriageError) -> Response {
    let status = match error {
        TriageError::Input(_) => StatusCode::BAD_REQUEST,
        TriageError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(
            "❌ Analyze request failed: {} (Category: {:?}, Severity: {:?})",
            error,
            error.category(),
            error.severity()
        );
    } else {
        tracing::info!("Analyze request rejected: {}", error);
    }

    (
        status,
        Json(ErrorResponse {
            error: error.user_friendly_message(),
        }),
    )
        .into_response()
}
