//! HTTP boundary for xmlcanon
//!
//! Two upload entry points share one pipeline (decode → parse → normalize);
//! they differ only in response shaping:
//!
//! - `/` renders an upload form and, on a multipart POST with a `file`
//!   field, answers with the canonical document as JSON, or a plain-text
//!   400 on bad input.
//! - `/api/converter/convert` is the JSON API flavor: errors come back as
//!   `{"error": ...}` bodies.

#![forbid(unsafe_code)]

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use xmlcanon::CanonicalDocument;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head><title>XML to JSON</title></head>
<body>
<h1>Convert XML to JSON</h1>
<form method="post" enctype="multipart/form-data">
  <input type="file" name="file" accept=".xml,text/xml" />
  <button type="submit">Convert</button>
</form>
</body>
</html>
"#;

/// Build the application router.
pub fn app() -> Router {
    use tower_http::cors::{Any, CorsLayer};

    Router::new()
        .route("/", get(upload_form).post(upload_page))
        .route("/api/health", get(health))
        .route("/api/converter/convert", post(convert))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// Page endpoint: POST with a `file` field converts; without one (or
/// without a multipart body at all) it falls back to rendering the form.
async fn upload_page(multipart: Result<Multipart, MultipartRejection>) -> Response {
    match read_file_field(multipart).await {
        Some(bytes) => match xmlcanon::canonicalize_bytes(&bytes) {
            Ok(doc) => json_response(&doc),
            Err(err) => {
                tracing::warn!(error = %err, "rejected upload");
                (StatusCode::BAD_REQUEST, "Invalid XML file").into_response()
            }
        },
        None => Html(UPLOAD_FORM).into_response(),
    }
}

/// API endpoint: same pipeline, JSON-shaped errors.
async fn convert(multipart: Result<Multipart, MultipartRejection>) -> Response {
    match read_file_field(multipart).await {
        Some(bytes) => match xmlcanon::canonicalize_bytes(&bytes) {
            Ok(doc) => json_response(&doc),
            Err(err) => {
                tracing::warn!(error = %err, "rejected upload");
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "Invalid XML file"})),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "No file uploaded"})),
        )
            .into_response(),
    }
}

/// Pull the bytes of the multipart field named `file`, if present.
async fn read_file_field(multipart: Result<Multipart, MultipartRejection>) -> Option<Vec<u8>> {
    let mut multipart = multipart.ok()?;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            return field.bytes().await.ok().map(|b| b.to_vec());
        }
    }
    None
}

fn json_response(doc: &CanonicalDocument) -> Response {
    (StatusCode::OK, Json(doc)).into_response()
}
