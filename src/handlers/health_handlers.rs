//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that pings MongoDB, MySQL and S3

use crate::{errors::GatewayResult, state::AppState};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::BTreeMap;

/// `GET /healthz`
///
/// Liveness probe. Never touches a backend.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Pings the three backends concurrently. HTTP 200 when all of them answer,
/// HTTP 503 otherwise, with one entry per backend in the body.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let (mongodb, mysql, s3) = tokio::join!(
        state.users.ping(),
        state.products.ping(),
        state.objects.ping()
    );

    let mut checks = BTreeMap::new();
    checks.insert("mongodb", CheckStatus::from(mongodb));
    checks.insert("mysql", CheckStatus::from(mysql));
    checks.insert("s3", CheckStatus::from(s3));

    let overall_ok = checks.values().all(|check| check.ok);
    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: BTreeMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

impl From<GatewayResult<()>> for CheckStatus {
    fn from(result: GatewayResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "readiness check failed");
                Self {
                    ok: false,
                    error: Some(err.public_message()),
                }
            }
        }
    }
}
