//! Per-operation input structs.
//!
//! One struct per backend operation, populated by the frontend from the
//! decoded HTTP request. Only the fields the backend consumes are carried;
//! header-level concerns (payers, grants, encryption) stay in the frontend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::request::StreamingBlob;
use crate::types::{CompletedPart, ObjectIdentifier};

/// Input for `HeadBucket`.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketInput {
    /// Bucket name.
    pub bucket: String,
}

/// Input for `CreateBucket`.
#[derive(Debug, Clone, Default)]
pub struct CreateBucketInput {
    /// Bucket name.
    pub bucket: String,
    /// Serialized ACL blob to attach to the new bucket.
    pub acl: Vec<u8>,
    /// Whether object lock is enabled from creation.
    pub object_lock_enabled_for_bucket: bool,
}

/// Input for `DeleteBucket`.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketInput {
    /// Bucket name.
    pub bucket: String,
}

/// Input for `ListObjects` (v1).
#[derive(Debug, Clone, Default)]
pub struct ListObjectsInput {
    /// Bucket name.
    pub bucket: String,
    /// Limit results to keys beginning with this prefix.
    pub prefix: Option<String>,
    /// Group keys by this delimiter into common prefixes.
    pub delimiter: Option<String>,
    /// Start listing strictly after this key.
    pub marker: Option<String>,
    /// Maximum entries per page.
    pub max_keys: Option<i32>,
}

/// Input for `ListObjectsV2`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Input {
    /// Bucket name.
    pub bucket: String,
    /// Limit results to keys beginning with this prefix.
    pub prefix: Option<String>,
    /// Group keys by this delimiter into common prefixes.
    pub delimiter: Option<String>,
    /// Continuation token from a previous truncated page.
    pub continuation_token: Option<String>,
    /// Start listing strictly after this key.
    pub start_after: Option<String>,
    /// Maximum entries per page.
    pub max_keys: Option<i32>,
}

/// Input for `PutObject`.
#[derive(Debug, Default)]
pub struct PutObjectInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key. A trailing `/` denotes a directory-object.
    pub key: String,
    /// Request body.
    pub body: StreamingBlob,
    /// Declared body length, used for quota preallocation.
    pub content_length: i64,
    /// `Content-Type` header.
    pub content_type: Option<String>,
    /// `Content-Encoding` header.
    pub content_encoding: Option<String>,
    /// User metadata from `x-amz-meta-*` headers (names without the prefix).
    pub metadata: HashMap<String, String>,
    /// Raw `X-Amz-Tagging` header (`k=v&k=v`).
    pub tagging: Option<String>,
    /// `x-amz-object-lock-legal-hold` header, when present.
    pub object_lock_legal_hold: Option<bool>,
    /// `x-amz-object-lock-mode` header.
    pub object_lock_mode: Option<String>,
    /// `x-amz-object-lock-retain-until-date` header.
    pub object_lock_retain_until_date: Option<DateTime<Utc>>,
}

/// Input for `GetObject`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// HTTP `Range` header; absent means the whole object.
    pub range: Option<String>,
}

/// Input for `HeadObject`.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// When set, stat this part of a pending multipart upload instead.
    pub part_number: Option<i32>,
}

/// Input for `CopyObject`.
#[derive(Debug, Clone, Default)]
pub struct CopyObjectInput {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// `x-amz-copy-source` header (`bucket/key`, possibly percent-encoded).
    pub copy_source: String,
    /// Replacement user metadata for same-path metadata rewrites.
    pub metadata: HashMap<String, String>,
}

/// Input for `DeleteObject`.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

/// Input for `DeleteObjects`.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectsInput {
    /// Bucket name.
    pub bucket: String,
    /// Keys to delete, in request order.
    pub objects: Vec<ObjectIdentifier>,
}

/// Input for `GetObjectAttributes`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAttributesInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Maximum parts to report for a pending multipart upload.
    pub max_parts: Option<i32>,
    /// Part-number marker for the part listing.
    pub part_number_marker: Option<String>,
}

/// Input for `CreateMultipartUpload`.
#[derive(Debug, Clone, Default)]
pub struct CreateMultipartUploadInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key the upload will publish to.
    pub key: String,
    /// User metadata to preserve until completion.
    pub metadata: HashMap<String, String>,
}

/// Input for `UploadPart`.
#[derive(Debug, Default)]
pub struct UploadPartInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key of the upload.
    pub key: String,
    /// Upload id returned by `CreateMultipartUpload`.
    pub upload_id: String,
    /// Part number (1-based).
    pub part_number: i32,
    /// Declared body length, used for quota preallocation.
    pub content_length: i64,
    /// Part body.
    pub body: StreamingBlob,
}

/// Input for `UploadPartCopy`.
#[derive(Debug, Clone, Default)]
pub struct UploadPartCopyInput {
    /// Destination bucket.
    pub bucket: String,
    /// Object key of the upload.
    pub key: String,
    /// Upload id returned by `CreateMultipartUpload`.
    pub upload_id: String,
    /// Part number (1-based).
    pub part_number: i32,
    /// `x-amz-copy-source` header (`bucket/key`).
    pub copy_source: String,
    /// `x-amz-copy-source-range` header; absent copies the whole source.
    pub copy_source_range: Option<String>,
}

/// Input for `ListParts`.
#[derive(Debug, Clone, Default)]
pub struct ListPartsInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key of the upload.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
    /// List parts strictly after this part number.
    pub part_number_marker: Option<String>,
    /// Maximum parts per page (`0` means unlimited).
    pub max_parts: Option<i32>,
}

/// Input for `ListMultipartUploads`.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsInput {
    /// Bucket name.
    pub bucket: String,
    /// Limit results to keys beginning with this prefix.
    pub prefix: Option<String>,
    /// Delimiter, echoed in the result.
    pub delimiter: Option<String>,
    /// Start listing after this key.
    pub key_marker: Option<String>,
    /// Start listing after this upload id.
    pub upload_id_marker: Option<String>,
    /// Maximum uploads per page.
    pub max_uploads: Option<i32>,
}

/// Input for `CompleteMultipartUpload`.
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUploadInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key the upload publishes to.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
    /// The client's part list, in the order the object is assembled.
    pub parts: Vec<CompletedPart>,
}

/// Input for `AbortMultipartUpload`.
#[derive(Debug, Clone, Default)]
pub struct AbortMultipartUploadInput {
    /// Bucket name.
    pub bucket: String,
    /// Object key of the upload.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
}
