//! Defines the routes of the tenant asset server.
//!
//! ## Structure
//! - **Reserved endpoints** (never routed to a tenant)
//!   - `GET /_/healthz` — liveness
//!   - `GET /_/readyz`  — readiness of the lookup and object store
//!
//! - **Tenant sites**
//!   - any other method and path — resolved against the tenant named by the
//!     `Host` header, with SPA fallback to `index.html`

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        site_handlers::serve_site,
    },
    services::site_service::SiteService,
};
use axum::{Router, routing::get};

/// Build and return the router.
///
/// The router carries shared state (`SiteService`) to all handlers.
pub fn routes() -> Router<SiteService> {
    Router::new()
        .route("/_/healthz", get(healthz))
        .route("/_/readyz", get(readyz))
        .fallback(serve_site)
}
