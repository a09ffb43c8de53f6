use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::{SiteAnalyzer, SiteSurveyError, VERSION, models::AnalysisResult};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub postcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

impl SiteSurveyError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteSurveyError::Validation { .. } => StatusCode::BAD_REQUEST,
            SiteSurveyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            SiteSurveyError::NotFound { .. } => StatusCode::NOT_FOUND,
            SiteSurveyError::Upstream { .. }
            | SiteSurveyError::Config { .. }
            | SiteSurveyError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiteSurveyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, details = ?self.details(), "analysis failed");
        } else {
            warn!(error = %self, "analysis rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

/// Routes under `/api`
pub fn router(analyzer: Arc<SiteAnalyzer>) -> Router {
    Router::new()
        .route("/analyze", post(analyze).options(preflight))
        .route("/health", get(health))
        .with_state(analyzer)
}

/// Complete application: routes plus body limit, panic recovery, CORS and request tracing
pub fn app(analyzer: Arc<SiteAnalyzer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .nest("/api", router(analyzer))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn analyze(
    State(analyzer): State<Arc<SiteAnalyzer>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, SiteSurveyError> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            SiteSurveyError::payload_too_large(format!(
                "Request body too large (limit {MAX_BODY_BYTES} bytes)"
            ))
        } else {
            SiteSurveyError::validation(format!("Malformed request body: {}", rejection.body_text()))
        }
    })?;
    let postcode = request.postcode.unwrap_or_default();

    let result = analyzer.analyze(&postcode).await?;
    Ok(Json(result))
}

/// A panicking handler still answers with the JSON error body
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };
    SiteSurveyError::unknown("Internal server error", Some(details)).into_response()
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: VERSION,
    })
}
