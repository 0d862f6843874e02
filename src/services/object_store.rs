//! src/services/object_store.rs
//!
//! Read-only object store collaborator. `DiskObjectStore` maps keys to files
//! beneath a root directory and streams them out. It never writes.

use crate::models::object::StoredObject;
use async_trait::async_trait;
use futures::StreamExt;
use std::{
    fs::Metadata,
    io::{self, ErrorKind},
    path::PathBuf,
    time::UNIX_EPOCH,
};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::debug;

const MAX_OBJECT_KEY_LEN: usize = 1024;
/// NAME_MAX on common filesystems; longer segments can never name a file.
const MAX_SEGMENT_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage root `{0}` is not a directory")]
    InvalidRoot(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Get-by-key access to an object store.
///
/// `Ok(None)` means the object is absent; `Err` is an operational failure
/// and must not be confused with absence.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Cheap readiness check used by `/_/readyz`.
    async fn health_check(&self) -> StoreResult<()>;
}

/// Object store rooted at a local directory: key `a/b.js` is the file
/// `{root}/a/b.js`.
#[derive(Clone, Debug)]
pub struct DiskObjectStore {
    root: PathBuf,
}

impl DiskObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys that could escape the root are treated as absent.
    ///
    /// Rejects `..` segments, segments too long for a file name, backslashes
    /// and control bytes.
    fn is_key_safe(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= MAX_OBJECT_KEY_LEN
            && !key
                .split('/')
                .any(|segment| segment == ".." || segment.len() > MAX_SEGMENT_LEN)
            && !key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }

    /// Revision token from size and modification time (nanosecond precision).
    fn etag_from_metadata(meta: &Metadata) -> Option<String> {
        let modified = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
        Some(format!(
            "{:x}.{:x}-{:x}",
            modified.as_secs(),
            modified.subsec_nanos(),
            meta.len()
        ))
    }
}

#[async_trait]
impl ObjectStore for DiskObjectStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        if !Self::is_key_safe(key) {
            debug!("rejecting unsafe object key {:?}", key);
            return Ok(None);
        }

        let path = self.object_path(key);
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Ok(None);
            }
            Err(err) => return Err(StoreError::Io(err)),
        };
        if !meta.is_file() {
            debug!("object key {} resolves to a non-file", key);
            return Ok(None);
        }

        let file = match File::open(&path).await {
            Ok(file) => file,
            // Removed between stat and open.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };

        Ok(Some(StoredObject {
            body: ReaderStream::new(file).boxed(),
            content_length: Some(meta.len()),
            etag: Self::etag_from_metadata(&meta),
        }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        let meta = fs::metadata(&self.root).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StoreError::InvalidRoot(self.root.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use std::time::{Duration, SystemTime};

    async fn read_body(object: StoredObject) -> Vec<u8> {
        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_disk_store_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sites/acme")).unwrap();
        std::fs::write(dir.path().join("sites/acme/app.js"), b"console.log(1);").unwrap();

        let store = DiskObjectStore::new(dir.path());
        let object = store.get("sites/acme/app.js").await.unwrap().unwrap();

        assert_eq!(object.content_length, Some(15));
        assert!(object.etag.as_deref().is_some_and(|e| e.ends_with("-f")));
        assert_eq!(read_body(object).await, b"console.log(1);");
    }

    #[tokio::test]
    async fn test_disk_store_leading_separator_stays_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html>").unwrap();

        let store = DiskObjectStore::new(dir.path());
        let object = store.get("/index.html").await.unwrap().unwrap();
        assert_eq!(read_body(object).await, b"<html>");
    }

    #[tokio::test]
    async fn test_disk_store_absent_cases() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sites/acme/docs")).unwrap();
        std::fs::write(dir.path().join("sites/acme/file.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

        let store = DiskObjectStore::new(dir.path().join("sites"));
        assert!(store.get("acme/missing.js").await.unwrap().is_none());
        assert!(store.get("acme/docs").await.unwrap().is_none());
        assert!(store.get("acme/file.txt/child").await.unwrap().is_none());
        assert!(store.get("acme/../../secret.txt").await.unwrap().is_none());
        assert!(store.get("acme\\file.txt").await.unwrap().is_none());
        assert!(store.get("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_store_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        assert!(DiskObjectStore::new(dir.path()).health_check().await.is_ok());
        assert!(matches!(
            DiskObjectStore::new(&file).health_check().await,
            Err(StoreError::InvalidRoot(_))
        ));
        assert!(matches!(
            DiskObjectStore::new(dir.path().join("gone")).health_check().await,
            Err(StoreError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_disk_store_overlong_segment_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sites/acme")).unwrap();

        let store = DiskObjectStore::new(dir.path());
        let key = format!("sites/acme/{}", "a".repeat(300));
        assert!(store.get(&key).await.unwrap().is_none());

        let at_limit = format!("sites/acme/{}", "b".repeat(MAX_SEGMENT_LEN));
        assert!(store.get(&at_limit).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_etag_tracks_subsecond_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        let store = DiskObjectStore::new(dir.path());
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        std::fs::write(&path, b"version-1").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(base)
            .unwrap();
        let first = store.get("app.js").await.unwrap().unwrap().etag;

        std::fs::write(&path, b"version-2").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(base + Duration::from_millis(250))
            .unwrap();
        let second = store.get("app.js").await.unwrap().unwrap().etag;

        assert!(first.is_some());
        assert_ne!(first, second);
    }
}
