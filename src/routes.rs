use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::AuditError;
use crate::report::{AuditResponse, render_html};
use crate::reviewer::CohereReviewer;
use crate::warning::{AuditWarning, WarningCode};
use crate::{audit_pdf_bytes, ensure_pdf_content_type};

/// 20 MiB upload cap; budget documents are far smaller.
const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

const UPLOAD_FORM: &str = r#"<!doctype html>
<html>
<head><title>Government Budget Validator</title></head>
<body>
<h1>Government Budget Validator</h1>
<form action="/audit" method="post" enctype="multipart/form-data">
  <p><label>Upload a PDF file containing the budget document:
    <input type="file" name="document" accept="application/pdf" required>
  </label></p>
  <p><button type="submit">Audit</button></p>
</form>
</body>
</html>
"#;

#[derive(Debug, Clone)]
pub struct AppState {
    pub reviewer: CohereReviewer,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(upload_form))
        .route("/health", get(health))
        .route("/audit", post(audit_html_route))
        .route("/api/v1/audit", post(audit_json_route))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn audit_html_route(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let (outcome, comment) = process_upload(&state, multipart).await?;
    Ok(Html(render_html(&outcome, comment.as_deref())))
}

async fn audit_json_route(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AuditResponse>, ApiError> {
    let (outcome, comment) = process_upload(&state, multipart).await?;
    Ok(Json(AuditResponse::from_outcome(&outcome, comment)))
}

/// Run the pipeline for one uploaded document and then consult the reviewer.
///
/// The reviewer call is strictly sequential after extraction and its failure
/// is downgraded to a warning — reconciliation results already computed are
/// never rolled back by it.
async fn process_upload(
    state: &AppState,
    multipart: Multipart,
) -> Result<(crate::AuditOutcome, Option<String>), ApiError> {
    let upload = read_upload(multipart).await?;
    ensure_pdf_content_type(&upload.content_type)?;

    let bytes = upload.bytes;
    let mut outcome = tokio::task::spawn_blocking(move || audit_pdf_bytes(&bytes))
        .await
        .map_err(|error| ApiError::Internal(error.to_string()))??;

    let comment = match state.reviewer.review(&outcome.transcript).await {
        Ok(comment) => Some(comment),
        Err(error) => {
            warn!(%error, "reviewer call failed; continuing without commentary");
            outcome.warnings.push(AuditWarning::new(
                WarningCode::ReviewerCallFailed,
                error.to_string(),
            ));
            None
        }
    };

    Ok((outcome, comment))
}

struct Upload {
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::BadRequest(error.to_string()))?
    {
        if field.name() != Some("document") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("unknown").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::BadRequest(error.to_string()))?
            .to_vec();
        return Ok(Upload {
            content_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest(
        "multipart upload must contain a 'document' field".to_string(),
    ))
}

/// Boundary error: every stage-local failure becomes one user-visible
/// message with a stable code, rendered here rather than swallowed by a
/// catch-all.
#[derive(Debug)]
pub enum ApiError {
    Audit(AuditError),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Audit(AuditError::InvalidFileType(_)) => "invalid_file_type",
            Self::Audit(AuditError::PdfParse(_)) => "extraction_error",
            Self::Audit(AuditError::NoTablesFound) => "no_tables_found",
            Self::Audit(AuditError::NoAmountColumns) => "no_amount_columns",
            Self::Audit(AuditError::Reviewer(_)) => "reviewer_error",
            Self::Audit(AuditError::Io(_) | AuditError::MissingConfig(_)) => "internal_error",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Audit(AuditError::InvalidFileType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Audit(
                AuditError::PdfParse(_)
                | AuditError::NoTablesFound
                | AuditError::NoAmountColumns,
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Audit(AuditError::Reviewer(_)) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Audit(AuditError::Io(_) | AuditError::MissingConfig(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Audit(error) => error.to_string(),
            Self::BadRequest(message) | Self::Internal(message) => message.clone(),
        }
    }
}

impl From<AuditError> for ApiError {
    fn from(error: AuditError) -> Self {
        Self::Audit(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "code": self.code(),
            "message": self.message(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::error::AuditError;
    use axum::http::StatusCode;

    #[test]
    fn maps_stage_errors_to_status_codes() {
        let invalid = ApiError::from(AuditError::InvalidFileType("text/plain".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(invalid.code(), "invalid_file_type");

        let no_tables = ApiError::from(AuditError::NoTablesFound);
        assert_eq!(no_tables.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(no_tables.code(), "no_tables_found");
    }
}
