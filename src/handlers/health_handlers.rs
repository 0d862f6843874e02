//! Health & readiness handlers.
//!
//! - GET /_/healthz  -> simple liveness ("ok")
//! - GET /_/readyz   -> readiness that checks the prefix lookup and object store

use crate::services::site_service::SiteService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;

/// `GET /_/healthz`
///
/// Liveness. Never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /_/readyz`
///
/// Runs each collaborator's `health_check`. HTTP 200 when both pass,
/// HTTP 503 otherwise, with a JSON body describing each check.
pub async fn readyz(State(site): State<SiteService>) -> impl IntoResponse {
    let lookup_check = match site.lookup().health_check().await {
        Ok(()) => CheckStatus::ok(),
        Err(e) => CheckStatus::failed(format!("error: {}", e)),
    };
    let store_check = match site.store().health_check().await {
        Ok(()) => CheckStatus::ok(),
        Err(e) => CheckStatus::failed(format!("error: {}", e)),
    };

    let overall_ok = lookup_check.ok && store_check.ok;

    let mut checks = HashMap::new();
    checks.insert("lookup", lookup_check);
    checks.insert("object_store", store_check);

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
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }
}
