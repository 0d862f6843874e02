//! HTTP handler for tenant site requests.
//! Every path that is not a reserved health endpoint lands here. Bodies are
//! streamed straight from the object store.

use crate::{
    errors::{AppError, NOT_FOUND, SUBDOMAIN_NOT_MAPPED},
    services::site_service::{Resolution, ServedObject, SiteService},
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::Response,
};
use tracing::debug;

/// Serve `{prefix}{path}` for the tenant named by the request host.
pub async fn serve_site(
    State(site): State<SiteService>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    let host = request_host(&headers, &uri);

    match site.resolve(host, uri.path()).await? {
        Resolution::Unmapped { tenant } => {
            debug!("tenant {:?} is not mapped", tenant);
            Err(AppError::not_found(SUBDOMAIN_NOT_MAPPED))
        }
        Resolution::NotFound { key } => {
            debug!("no object for {}", key);
            Err(AppError::not_found(NOT_FOUND))
        }
        Resolution::Primary(served) | Resolution::Fallback(served) => {
            debug!("serving {}", served.key);
            Ok(object_response(served))
        }
    }
}

/// `Host` header, or the URI authority for HTTP/2 requests that carry none.
fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> &'a str {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or_default()
}

fn object_response(served: ServedObject) -> Response {
    let ServedObject {
        object,
        content_type,
        cache_policy,
        ..
    } = served;

    let mut response = Response::new(Body::from_stream(object.body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();

    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    if let Ok(value) = HeaderValue::from_str(&cache_policy.to_header_value()) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    if let Some(etag) = object.etag.as_deref() {
        if let Ok(value) = HeaderValue::from_str(&quote_etag(etag)) {
            headers.insert(header::ETAG, value);
        }
    }

    if let Some(length) = object.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    response
}

/// Wrap a validator in quotes unless the store already did.
fn quote_etag(etag: &str) -> String {
    if etag.starts_with('"') || etag.starts_with("W/\"") {
        etag.to_string()
    } else {
        format!("\"{}\"", etag)
    }
}
