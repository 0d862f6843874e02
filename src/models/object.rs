//! Represents an object (file) fetched from an object store.

use bytes::Bytes;
use futures::stream::BoxStream;
use std::{fmt, io};

/// Streaming payload of a stored object.
pub type ObjectBody = BoxStream<'static, io::Result<Bytes>>;

/// A single object as returned by an [`ObjectStore`](crate::services::object_store::ObjectStore).
///
/// The body is streamed so large assets never sit fully in memory.
pub struct StoredObject {
    /// Raw object bytes.
    pub body: ObjectBody,

    /// Size in bytes, when the store knows it up front.
    pub content_length: Option<u64>,

    /// Opaque revision token (unquoted).
    pub etag: Option<String>,
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("content_length", &self.content_length)
            .field("etag", &self.etag)
            .finish_non_exhaustive()
    }
}
