//! In-memory stand-ins for the lookup and object store, used by the tests.

use crate::{
    models::{object::StoredObject, tenant::TenantPrefix},
    services::{
        lookup::{LookupResult, PrefixLookup},
        object_store::{ObjectStore, StoreResult},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, future, stream};
use std::{collections::HashMap, io};

/// Fixed in-memory mapping.
#[derive(Clone, Debug, Default)]
pub struct MemoryPrefixLookup {
    mappings: HashMap<String, String>,
}

impl MemoryPrefixLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_mapping(mut self, tenant: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.mappings.insert(tenant.into(), prefix.into());
        self
    }
}

impl FromIterator<TenantPrefix> for MemoryPrefixLookup {
    fn from_iter<I: IntoIterator<Item = TenantPrefix>>(iter: I) -> Self {
        Self {
            mappings: iter.into_iter().map(|m| (m.tenant, m.prefix)).collect(),
        }
    }
}

#[async_trait]
impl PrefixLookup for MemoryPrefixLookup {
    async fn get(&self, tenant: &str) -> LookupResult<Option<String>> {
        Ok(self.mappings.get(tenant).cloned())
    }

    async fn health_check(&self) -> LookupResult<()> {
        Ok(())
    }
}

/// Fixed in-memory object set. ETags are MD5 digests of the content.
#[derive(Clone, Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<String, (Bytes, String)>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_object(mut self, key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let etag = format!("{:x}", md5::compute(&body));
        self.objects.insert(key.into(), (body, etag));
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects.get(key).map(|(body, etag)| StoredObject {
            content_length: Some(body.len() as u64),
            etag: Some(etag.clone()),
            body: stream::once(future::ready(Ok::<_, io::Error>(body.clone()))).boxed(),
        }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_memory_lookup() {
        let lookup: MemoryPrefixLookup = [TenantPrefix {
            tenant: "acme".into(),
            prefix: "sites/acme".into(),
        }]
        .into_iter()
        .collect();
        let lookup = lookup.with_mapping("globex", "sites/globex/");

        assert_eq!(lookup.get("acme").await.unwrap().as_deref(), Some("sites/acme"));
        assert_eq!(
            lookup.get("globex").await.unwrap().as_deref(),
            Some("sites/globex/")
        );
        assert_eq!(lookup.get("initech").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_md5_etag() {
        let store = MemoryObjectStore::new().with_object("k", "hello world");
        let object = store.get("k").await.unwrap().unwrap();

        assert_eq!(
            object.etag.as_deref(),
            Some("5eb63bbbe01eeed093cb22bb8f5acdc3")
        );
        assert_eq!(object.content_length, Some(11));
        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello world");
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
