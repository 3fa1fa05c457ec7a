//! Per-operation output structs.
//!
//! Mirrors `input`: one struct per backend operation, consumed by the
//! frontend's XML serializers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::{
    BucketEntry, CopyObjectResult, DeleteError, DeletedObject, Object, ObjectParts, Part, Upload,
};

/// Output of `HeadBucket`.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketOutput {}

/// Output of `ListBuckets`.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// Buckets visible to the caller, sorted by name.
    pub buckets: Vec<BucketEntry>,
    /// Canonical id of the caller.
    pub owner: String,
}

/// Output of `ListObjects` (v1).
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOutput {
    /// Matching objects in key order.
    pub contents: Vec<Object>,
    /// Rolled-up key groups when a delimiter was supplied.
    pub common_prefixes: Vec<String>,
    /// Echo of the request delimiter.
    pub delimiter: String,
    /// Whether more entries remain.
    pub is_truncated: bool,
    /// Echo of the request marker.
    pub marker: String,
    /// Echo of the request max-keys.
    pub max_keys: i32,
    /// Bucket name.
    pub name: String,
    /// Marker for the next page when truncated.
    pub next_marker: String,
    /// Echo of the request prefix.
    pub prefix: String,
}

/// Output of `ListObjectsV2`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Output {
    /// Matching objects in key order.
    pub contents: Vec<Object>,
    /// Rolled-up key groups when a delimiter was supplied.
    pub common_prefixes: Vec<String>,
    /// Echo of the request delimiter.
    pub delimiter: String,
    /// Whether more entries remain.
    pub is_truncated: bool,
    /// Echo of the effective continuation token.
    pub continuation_token: String,
    /// Echo of the request max-keys.
    pub max_keys: i32,
    /// Bucket name.
    pub name: String,
    /// Continuation token for the next page when truncated.
    pub next_continuation_token: String,
    /// Echo of the request prefix.
    pub prefix: String,
    /// Number of keys returned in this page.
    pub key_count: i32,
}

/// Output of `PutObject`.
#[derive(Debug, Clone, Default)]
pub struct PutObjectOutput {
    /// Hex MD5 etag of the stored body.
    pub etag: String,
}

/// Output of `GetObject`. The body is streamed separately to the caller's
/// writer; this struct carries the assembled metadata.
#[derive(Debug, Clone, Default)]
pub struct GetObjectOutput {
    /// Always `bytes`.
    pub accept_ranges: String,
    /// Number of body bytes written.
    pub content_length: i64,
    /// `Content-Range` value when a range was requested.
    pub content_range: Option<String>,
    /// Stored content type, if any.
    pub content_type: Option<String>,
    /// Stored content encoding, if any.
    pub content_encoding: Option<String>,
    /// Hex MD5 etag; empty when the object carries no etag attribute.
    pub etag: String,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// User metadata (names without the `x-amz-meta-` prefix).
    pub metadata: HashMap<String, String>,
    /// Number of tags on the object, when a tag set exists.
    pub tag_count: Option<i32>,
}

/// Output of `HeadObject`.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectOutput {
    /// Object (or part) size in bytes.
    pub content_length: i64,
    /// Stored content type, if any.
    pub content_type: Option<String>,
    /// Stored content encoding, if any.
    pub content_encoding: Option<String>,
    /// Hex MD5 etag; empty when absent.
    pub etag: String,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// User metadata.
    pub metadata: HashMap<String, String>,
    /// Part count, when a part number was requested.
    pub parts_count: Option<i32>,
    /// Stored retention mode, if any.
    pub object_lock_mode: Option<String>,
    /// Stored retain-until date, if any.
    pub object_lock_retain_until_date: Option<DateTime<Utc>>,
    /// Stored legal-hold state, if any.
    pub object_lock_legal_hold: Option<bool>,
}

/// Output of `CopyObject`.
#[derive(Debug, Clone)]
pub struct CopyObjectOutput {
    /// Etag and mtime of the destination.
    pub copy_object_result: CopyObjectResult,
}

/// Output of `DeleteObjects`.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectsOutput {
    /// Keys deleted successfully.
    pub deleted: Vec<DeletedObject>,
    /// Per-key failures, in request order.
    pub errors: Vec<DeleteError>,
}

/// Output of `GetObjectAttributes`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAttributesOutput {
    /// Hex MD5 etag, when the object exists.
    pub etag: Option<String>,
    /// Last modification time, when the object exists.
    pub last_modified: Option<DateTime<Utc>>,
    /// Object size in bytes, when the object exists.
    pub object_size: Option<i64>,
    /// In-progress part list, when only a multipart upload exists.
    pub object_parts: Option<ObjectParts>,
}

/// Output of `CreateMultipartUpload`.
#[derive(Debug, Clone, Default)]
pub struct CreateMultipartUploadOutput {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Freshly generated upload id.
    pub upload_id: String,
}

/// Output of `UploadPart`.
#[derive(Debug, Clone, Default)]
pub struct UploadPartOutput {
    /// Hex MD5 etag of the part body.
    pub etag: String,
}

/// Output of `UploadPartCopy`.
#[derive(Debug, Clone)]
pub struct UploadPartCopyOutput {
    /// Etag and mtime of the copied part.
    pub copy_part_result: CopyObjectResult,
}

/// Output of `ListParts`.
#[derive(Debug, Clone, Default)]
pub struct ListPartsOutput {
    /// Bucket name.
    pub bucket: String,
    /// Object key of the upload.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
    /// Part-number marker the listing started after.
    pub part_number_marker: i32,
    /// Marker for the next page (last included part).
    pub next_part_number_marker: i32,
    /// Echo of the request max-parts.
    pub max_parts: i32,
    /// Whether more parts remain.
    pub is_truncated: bool,
    /// The parts, ascending by part number.
    pub parts: Vec<Part>,
}

/// Output of `ListMultipartUploads`.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsOutput {
    /// Bucket name.
    pub bucket: String,
    /// Echo of the request delimiter.
    pub delimiter: String,
    /// Echo of the request key marker.
    pub key_marker: String,
    /// Echo of the request upload-id marker.
    pub upload_id_marker: String,
    /// Key marker for the next page when truncated.
    pub next_key_marker: String,
    /// Upload-id marker for the next page when truncated.
    pub next_upload_id_marker: String,
    /// Echo of the request max-uploads.
    pub max_uploads: i32,
    /// Whether more uploads remain.
    pub is_truncated: bool,
    /// Echo of the request prefix.
    pub prefix: String,
    /// In-progress uploads, ascending by key.
    pub uploads: Vec<Upload>,
}

/// Output of `CompleteMultipartUpload`.
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUploadOutput {
    /// Bucket name.
    pub bucket: String,
    /// Object key the upload published to.
    pub key: String,
    /// Composite multipart etag (`<hex>-<part_count>`).
    pub etag: String,
}
