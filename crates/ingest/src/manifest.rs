//! Load manifest pointing the warehouse at the batch's data file.

use serde::{Deserialize, Serialize};

use livesink_core::{ObjectStore, StorageUri};

use crate::error::IngestError;
use crate::Result;

/// Pointer document the warehouse reads to locate the data to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub mandatory: bool,
    pub meta: EntryMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    pub content_length: u64,
}

/// Builds the manifest for a batch prefix by re-listing it and locating the
/// written data file. A prefix without a `.parquet` object is a broken
/// batch, reported as `MissingDataFile`.
pub async fn build_manifest(store: &dyn ObjectStore, prefix: &str) -> Result<Manifest> {
    let listed = store.list_objects(prefix).await?;
    let data_object = listed
        .into_iter()
        .find(|meta| meta.key.ends_with(".parquet"))
        .ok_or_else(|| IngestError::MissingDataFile(prefix.to_string()))?;

    let url = StorageUri::new(store.bucket(), data_object.key).to_string();
    Ok(Manifest {
        entries: vec![ManifestEntry {
            url,
            mandatory: true,
            meta: EntryMeta {
                content_length: data_object.size,
            },
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use livesink_core::MemoryObjectStore;

    #[tokio::test]
    async fn manifest_references_the_single_data_file() {
        let store = MemoryObjectStore::new("test-bucket");
        store
            .put_object(
                "live_data/batch_t/data.parquet",
                Bytes::from_static(b"0123456789"),
                "application/octet-stream",
            )
            .await
            .unwrap();

        let manifest = build_manifest(&store, "live_data/batch_t/").await.unwrap();
        assert_eq!(manifest.entries.len(), 1);
        let entry = &manifest.entries[0];
        assert_eq!(entry.url, "s3://test-bucket/live_data/batch_t/data.parquet");
        assert!(entry.mandatory);
        assert_eq!(entry.meta.content_length, 10);
    }

    #[tokio::test]
    async fn missing_data_file_is_fatal() {
        let store = MemoryObjectStore::new("test-bucket");
        store
            .put_object(
                "live_data/batch_t/notes.txt",
                Bytes::from_static(b"not parquet"),
                "text/plain",
            )
            .await
            .unwrap();

        let err = build_manifest(&store, "live_data/batch_t/").await.unwrap_err();
        assert!(matches!(err, IngestError::MissingDataFile(_)));
    }

    #[test]
    fn manifest_serializes_to_the_wire_shape() {
        let manifest = Manifest {
            entries: vec![ManifestEntry {
                url: "s3://b/k/data.parquet".to_string(),
                mandatory: true,
                meta: EntryMeta { content_length: 42 },
            }],
        };

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entries": [
                    {
                        "url": "s3://b/k/data.parquet",
                        "mandatory": true,
                        "meta": { "content_length": 42 }
                    }
                ]
            })
        );
    }
}
