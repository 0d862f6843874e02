//! src/services/site_service.rs
//!
//! SiteService — resolves a (host, path) pair to the object that should be
//! served. Holds the two collaborators and nothing else; every request is an
//! independent, strictly sequential lookup → primary fetch → fallback fetch.

use crate::{
    models::object::StoredObject,
    services::{
        asset_policy::{
            self, CachePolicy, INDEX_DOCUMENT, cache_policy_for, content_type_for, join_key,
            normalize_path, tenant_from_host,
        },
        lookup::{LookupError, PrefixLookup},
        object_store::{ObjectStore, StoreError},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("prefix lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("object fetch failed: {0}")]
    Store(#[from] StoreError),
}

pub type SiteResult<T> = Result<T, SiteError>;

/// An object ready to be written out, with its computed headers.
#[derive(Debug)]
pub struct ServedObject {
    /// Storage key the object was read from.
    pub key: String,
    pub object: StoredObject,
    pub content_type: Option<&'static str>,
    pub cache_policy: CachePolicy,
}

/// Outcome of resolving one request. Exactly one variant holds per request.
#[derive(Debug)]
pub enum Resolution {
    /// No prefix is mapped for the tenant.
    Unmapped { tenant: String },
    /// The object at the primary key.
    Primary(ServedObject),
    /// The tenant's index document, served for a client-side route.
    Fallback(ServedObject),
    /// Neither the primary key nor (where eligible) the fallback exists.
    NotFound { key: String },
}

#[derive(Clone)]
pub struct SiteService {
    lookup: Arc<dyn PrefixLookup>,
    store: Arc<dyn ObjectStore>,
}

impl SiteService {
    pub fn new(lookup: Arc<dyn PrefixLookup>, store: Arc<dyn ObjectStore>) -> Self {
        Self { lookup, store }
    }

    pub fn lookup(&self) -> &dyn PrefixLookup {
        self.lookup.as_ref()
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Resolve `path` on the site addressed by `host`.
    ///
    /// `host` is the raw authority (port allowed); `path` excludes the query.
    /// Collaborator failures surface as `Err` and are never retried.
    pub async fn resolve(&self, host: &str, path: &str) -> SiteResult<Resolution> {
        let tenant = tenant_from_host(host);

        let prefix = match self.lookup.get(&tenant).await? {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => return Ok(Resolution::Unmapped { tenant }),
        };

        let path = normalize_path(path);
        let key = join_key(&prefix, path);
        debug!("fetching object key {}", key);

        if let Some(object) = self.store.get(&key).await? {
            let ext = asset_policy::extension(path);
            return Ok(Resolution::Primary(ServedObject {
                key,
                object,
                content_type: content_type_for(ext.as_deref()),
                cache_policy: cache_policy_for(path),
            }));
        }

        if asset_policy::is_literal_asset(path) {
            return Ok(Resolution::NotFound { key });
        }

        let index_key = join_key(&prefix, INDEX_DOCUMENT);
        if index_key == key {
            // `/` and `/index.html` already missed on the primary fetch.
            return Ok(Resolution::NotFound { key });
        }

        debug!("{} missing, falling back to {}", key, index_key);
        match self.store.get(&index_key).await? {
            Some(object) => Ok(Resolution::Fallback(ServedObject {
                key: index_key,
                object,
                content_type: Some("text/html"),
                cache_policy: CachePolicy::DOCUMENT,
            })),
            None => Ok(Resolution::NotFound { key }),
        }
    }
}
