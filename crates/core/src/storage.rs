//! Bucket-scoped object storage.
//!
//! Both pipeline stages address objects through the [`ObjectStore`] trait and
//! name them with `s3://bucket/key` URIs regardless of the backend actually
//! holding the bytes. [`FsObjectStore`] keeps objects under a local root
//! directory; [`MemoryObjectStore`] backs tests.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::LivesinkError;

/// Location of an object, rendered as `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUri {
    pub bucket: String,
    pub key: String,
}

impl StorageUri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parses `s3://bucket/key`. The key may itself contain slashes.
    pub fn parse(uri: &str) -> Result<Self, LivesinkError> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| LivesinkError::InvalidUri(format!("expected s3:// scheme: {}", uri)))?;
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| LivesinkError::InvalidUri(format!("missing key component: {}", uri)))?;
        if bucket.is_empty() || key.is_empty() {
            return Err(LivesinkError::InvalidUri(format!(
                "empty bucket or key: {}",
                uri
            )));
        }
        Ok(Self::new(bucket, key))
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for StorageUri {
    type Err = LivesinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Key and byte size of a stored object, as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
}

/// Storage operations scoped to a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store is scoped to.
    fn bucket(&self) -> &str;

    /// Writes an object, replacing any existing object at the same key.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<(), LivesinkError>;

    /// Reads an object's bytes. Missing keys are `ObjectNotFound`.
    async fn get_object(&self, key: &str) -> Result<Bytes, LivesinkError>;

    /// Lists objects whose keys start with `prefix`, sorted by key.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectMeta>, LivesinkError>;

    /// Returns the object's metadata, or `None` when the key does not exist.
    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>, LivesinkError>;

    /// Full URI for a key within this store's bucket.
    fn uri_for(&self, key: &str) -> StorageUri {
        StorageUri::new(self.bucket(), key)
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
}

/// In-memory store used by tests.
pub struct MemoryObjectStore {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Content type recorded for a key, if the key exists.
    pub async fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|object| object.content_type.clone())
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), LivesinkError> {
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, LivesinkError> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| LivesinkError::ObjectNotFound(key.to_string()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectMeta>, LivesinkError> {
        let objects = self.objects.lock().await;
        let mut metas: Vec<ObjectMeta> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectMeta {
                key: key.clone(),
                size: object.body.len() as u64,
            })
            .collect();
        metas.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metas)
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>, LivesinkError> {
        Ok(self.objects.lock().await.get(key).map(|object| ObjectMeta {
            key: key.to_string(),
            size: object.body.len() as u64,
        }))
    }
}

/// Filesystem-backed store. Objects live under `<root>/<bucket>/<key>`.
pub struct FsObjectStore {
    root: PathBuf,
    bucket: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn base_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir().join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    // Content types are not representable on a plain filesystem; the
    // argument is accepted for interface parity and dropped.
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), LivesinkError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                LivesinkError::StorageError(format!(
                    "failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        tokio::fs::write(&path, &body).await.map_err(|e| {
            LivesinkError::StorageError(format!("failed to write {}: {}", path.display(), e))
        })
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, LivesinkError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LivesinkError::ObjectNotFound(key.to_string()))
            }
            Err(e) => Err(LivesinkError::StorageError(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectMeta>, LivesinkError> {
        let base = self.base_dir();
        let mut metas = Vec::new();
        let mut pending = vec![base.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(LivesinkError::StorageError(format!(
                        "failed to list {}: {}",
                        dir.display(),
                        e
                    )))
                }
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                LivesinkError::StorageError(format!("failed to list {}: {}", dir.display(), e))
            })? {
                let path = entry.path();
                let metadata = entry.metadata().await.map_err(|e| {
                    LivesinkError::StorageError(format!(
                        "failed to stat {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }
                let key = match path.strip_prefix(&base) {
                    Ok(relative) => relative.to_string_lossy().into_owned(),
                    Err(_) => continue,
                };
                if key.starts_with(prefix) {
                    metas.push(ObjectMeta {
                        key,
                        size: metadata.len(),
                    });
                }
            }
        }
        metas.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metas)
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectMeta>, LivesinkError> {
        let path = self.path_for(key);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(Some(ObjectMeta {
                key: key.to_string(),
                size: metadata.len(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LivesinkError::StorageError(format!(
                "failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
