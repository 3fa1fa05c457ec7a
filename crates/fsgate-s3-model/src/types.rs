//! Shared entity types crossing the frontend/backend boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated gateway account, resolved by the IAM service and carried
/// on every request context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Access key, used as the canonical owner id in ACLs.
    pub access: String,
    /// Posix uid objects may be chowned to.
    pub user_id: u32,
    /// Posix gid objects may be chowned to.
    pub group_id: u32,
}

/// A single ACL grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grantee {
    /// Access key of the grantee account.
    pub access: String,
    /// Granted permission (`FULL_CONTROL`, `READ`, ...).
    pub permission: String,
}

/// Bucket ACL as stored under the bucket's `acl` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Access key of the owning account.
    pub owner: String,
    /// Explicit grants beyond the owner.
    #[serde(default)]
    pub grantees: Vec<Grantee>,
}

/// Bucket-level object lock state, stored under the `bucket-lock` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketLockConfig {
    /// Whether object lock is enabled for the bucket.
    pub enabled: bool,
    /// When object lock was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-object retention, stored under the `object-retention` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLockRetention {
    /// Retention mode (`GOVERNANCE` or `COMPLIANCE`).
    pub mode: String,
    /// The object may not be deleted before this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_until_date: Option<DateTime<Utc>>,
}

/// One bucket in a `ListBuckets` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry {
    /// Bucket name.
    pub name: String,
    /// Creation date (directory mtime).
    pub creation_date: DateTime<Utc>,
}

/// One bucket with its ACL owner, for the admin listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// Access key of the owning account.
    pub owner: String,
}

/// One object in a listing result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Full object key. Directory-objects end with `/`.
    pub key: String,
    /// Hex MD5 etag; empty when the object carries no etag attribute.
    pub etag: String,
    /// Object size in bytes (0 for directory-objects).
    pub size: i64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

/// Identifies one key in a `DeleteObjects` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectIdentifier {
    /// Key to delete.
    pub key: String,
}

/// Per-key success entry of a `DeleteObjects` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedObject {
    /// The deleted key.
    pub key: String,
}

/// Per-key failure entry of a `DeleteObjects` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteError {
    /// The key that failed to delete.
    pub key: String,
    /// S3 error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// One part of an in-progress multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part number (1-based).
    pub part_number: i32,
    /// Hex MD5 etag of the part data.
    pub etag: String,
    /// Part size in bytes.
    pub size: i64,
    /// When the part was last written.
    pub last_modified: DateTime<Utc>,
}

/// A `(part_number, etag)` pair supplied to `CompleteMultipartUpload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// Part number (1-based).
    pub part_number: i32,
    /// Etag the client observed when uploading the part.
    pub etag: String,
}

/// One in-progress upload in a `ListMultipartUploads` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Object key the upload targets.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
    /// When the upload was initiated.
    pub initiated: DateTime<Utc>,
}

/// Result of a server-side copy (whole object or part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectResult {
    /// Hex MD5 etag of the copied data.
    pub etag: String,
    /// Modification time of the destination.
    pub last_modified: DateTime<Utc>,
}

/// Part summary inside a `GetObjectAttributes` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPart {
    /// Part number (1-based).
    pub part_number: i32,
    /// Part size in bytes.
    pub size: i64,
}

/// In-progress part list inside a `GetObjectAttributes` result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectParts {
    /// Whether the part list was truncated.
    pub is_truncated: bool,
    /// Max parts requested.
    pub max_parts: i32,
    /// Part-number marker the listing started after.
    pub part_number_marker: i32,
    /// Marker for the next page.
    pub next_part_number_marker: i32,
    /// The parts.
    pub parts: Vec<ObjectPart>,
}
