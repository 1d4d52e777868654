#![allow(clippy::result_large_err)]

//! Thin HTTP boundary over the round orchestrator.
//!
//! Secret validation and malformed-input rejection happen here; everything
//! past the dispatch call is the core's responsibility.

use crate::core::error::AppError;
use crate::core::orchestrator::RoundOrchestrator;
use crate::core::types::ErrorCategory;
use axum::{
    body::{Body, Bytes},
    extract::Extension,
    http::{header, HeaderValue, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use siteforge_types::TaskRequest;
use std::net::SocketAddr;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::MapResponseLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// State shared across requests.
pub struct AppState {
    pub orchestrator: Arc<RoundOrchestrator>,
    pub secret: String,
}

/// Start the listener and block until the service terminates.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<(), AppError> {
    serve_internal(state, bind, None).await
}

/// Start the listener and notify once the bind address is known (test helper).
pub async fn serve_with_ready_notifier(
    state: Arc<AppState>,
    bind: &str,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(state, bind, Some(ready_notifier)).await
}

async fn serve_internal(
    state: Arc<AppState>,
    bind: &str,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let bind_addr: SocketAddr = bind.parse().map_err(|err| {
        AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid bind address {}: {}", bind, err),
        )
    })?;

    let router = Router::new()
        .route("/", get(handle_root))
        .route("/api-endpoint", post(handle_task))
        .layer(Extension(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(MapResponseLayer::new(|mut response: Response<Body>| {
            if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
                let body = json!({
                    "error": {
                        "code": "SF-API-413",
                        "message": "payload too large"
                    }
                })
                .to_string();
                *response.body_mut() = Body::from(body);
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            response
        }));

    let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind listener {}: {}", bind_addr, err),
        )
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("siteforge listening on {}", local_addr);
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("server terminated: {}", err),
            )
        })
}

async fn handle_root() -> Json<Value> {
    Json(json!({"message": "siteforge is running"}))
}

async fn handle_task(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiRejection> {
    let request: TaskRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiRejection::bad_request("invalid JSON payload"))?;

    if !secret_matches(&request.secret, &state.secret) {
        return Err(ApiRejection::forbidden());
    }

    let outcome = state
        .orchestrator
        .handle(request)
        .await
        .map_err(ApiRejection::internal)?;

    Ok(Json(serde_json::to_value(outcome).map_err(|err| {
        ApiRejection::internal(AppError::from(err))
    })?))
}

fn secret_matches(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

struct ApiRejection {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl ApiRejection {
    fn bad_request(message: &'static str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "SF-API-400",
            message,
        }
    }

    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "SF-API-403",
            message: "invalid secret",
        }
    }

    fn internal(err: AppError) -> Self {
        tracing::error!("round execution error: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "SF-API-500",
            message: "round execution failed",
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response<Body> {
        let mut resp = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        }))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
