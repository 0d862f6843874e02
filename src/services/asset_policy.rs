//! Pure request-routing rules: tenant extraction, key construction,
//! asset classification, MIME lookup and cache-control policy.
//!
//! Nothing here touches I/O, so every rule is exercised directly by the
//! unit tests at the bottom of the file.

/// Document served for `/` and used as the SPA fallback.
pub const INDEX_DOCUMENT: &str = "/index.html";

/// Extensions that name concrete static files. A miss on one of these is a
/// plain 404 and never falls back to the index document.
const LITERAL_ASSET_EXTENSIONS: [&str; 17] = [
    "js", "css", "png", "jpg", "jpeg", "svg", "ico", "json", "wasm", "txt", "woff", "woff2",
    "ttf", "eot", "gif", "bmp", "webp",
];

/// Extensions that get the long immutable cache lifetime.
const IMMUTABLE_MEDIA_EXTENSIONS: [&str; 11] = [
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2", "ttf", "eot",
];

/// Minimum length of the hex fingerprint in `name.<hash>.js`.
const MIN_FINGERPRINT_LEN: usize = 8;

/// Cache-Control policies emitted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// `public, max-age=N, must-revalidate`
    MustRevalidate(u32),
    /// `public, max-age=N, immutable`
    Immutable(u32),
    /// `public, max-age=N`
    Public(u32),
}

impl CachePolicy {
    /// Policy for HTML documents and unfingerprinted scripts/styles.
    pub const DOCUMENT: Self = Self::MustRevalidate(3600);
    /// Policy for fingerprinted scripts/styles.
    pub const FINGERPRINTED: Self = Self::Immutable(31_536_000);
    /// Policy for images and fonts.
    pub const MEDIA: Self = Self::Immutable(2_592_000);
    /// Everything else.
    pub const DEFAULT: Self = Self::Public(86_400);

    /// Convert to a Cache-Control header value.
    pub fn to_header_value(self) -> String {
        match self {
            Self::MustRevalidate(max_age) => {
                format!("public, max-age={max_age}, must-revalidate")
            }
            Self::Immutable(max_age) => format!("public, max-age={max_age}, immutable"),
            Self::Public(max_age) => format!("public, max-age={max_age}"),
        }
    }
}

/// Strip the port (and keep IPv6 brackets intact) from a `Host` authority.
pub fn host_name(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    authority.split(':').next().unwrap_or(authority)
}

/// Tenant identifier: the first `.`-delimited label of the host name.
///
/// Host names are case-insensitive, so the label is lowercased. No other
/// validation happens here; an empty label is handed to the lookup as-is.
pub fn tenant_from_host(authority: &str) -> String {
    host_name(authority)
        .split('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Map the empty path and `/` to the index document; keep anything else.
pub fn normalize_path(path: &str) -> &str {
    match path {
        "" | "/" => INDEX_DOCUMENT,
        other => other,
    }
}

/// Join a tenant prefix and a request path with exactly one `/` between
/// them. Separators inside either half are left alone.
pub fn join_key(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Final path segment.
fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lowercased extension of the final path segment, if any.
pub fn extension(path: &str) -> Option<String> {
    file_name(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Whether the path names a concrete static file rather than an app route.
pub fn is_literal_asset(path: &str) -> bool {
    extension(path).is_some_and(|ext| LITERAL_ASSET_EXTENSIONS.contains(&ext.as_str()))
}

/// `name.<hex fingerprint>.js` / `.css` as emitted by bundlers.
pub fn is_fingerprinted(path: &str) -> bool {
    let mut parts = file_name(path).rsplitn(3, '.');
    let (Some(ext), Some(hash), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !name.is_empty()
        && (ext.eq_ignore_ascii_case("js") || ext.eq_ignore_ascii_case("css"))
        && hash.len() >= MIN_FINGERPRINT_LEN
        && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Content-Type for an extension; unknown extensions get no header at all.
pub fn content_type_for(extension: Option<&str>) -> Option<&'static str> {
    match extension {
        Some("html") => Some("text/html"),
        Some("js") => Some("application/javascript"),
        Some("css") => Some("text/css"),
        Some("json") => Some("application/json"),
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("svg") => Some("image/svg+xml"),
        Some("ico") => Some("image/x-icon"),
        Some("txt") => Some("text/plain"),
        Some("wasm") => Some("application/wasm"),
        _ => None,
    }
}

/// Cache policy for a primary hit. Rules are evaluated top to bottom; the
/// fingerprint rule must run before the generic js/css rule.
pub fn cache_policy_for(path: &str) -> CachePolicy {
    let ext = extension(path);
    let ext = ext.as_deref();

    if ext == Some("html") {
        return CachePolicy::DOCUMENT;
    }
    if is_fingerprinted(path) {
        return CachePolicy::FINGERPRINTED;
    }
    if matches!(ext, Some("js" | "css")) {
        return CachePolicy::DOCUMENT;
    }
    if ext.is_some_and(|e| IMMUTABLE_MEDIA_EXTENSIONS.contains(&e)) {
        return CachePolicy::MEDIA;
    }
    CachePolicy::DEFAULT
}
