//! Objects stored in a bucket. Only metadata is described here; content
//! passes straight through to the object store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of `GET /buckets/{bucketName}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
    pub storage_class: Option<String>,
}

/// A file received through `POST /buckets/{bucketName}/upload`.
#[derive(Clone, Debug)]
pub struct Upload {
    pub bucket: String,
    pub key: String,
    pub content: Bytes,
    pub content_type: Option<String>,
}

/// What the object store assigned to an uploaded object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
    pub size: usize,
    pub etag: Option<String>,
    pub version_id: Option<String>,
}
