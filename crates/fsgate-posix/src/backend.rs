//! The backend operation set consumed by the request frontend.
//!
//! [`Backend`] is object-safe so the frontend can hold any storage flavor
//! behind `Arc<dyn Backend>`. Operations are synchronous from the caller's
//! point of view: each call completes the filesystem work (or fails) before
//! returning. The authenticated [`Account`] travels explicitly on the
//! operations that create filesystem state or filter by ownership.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use fsgate_s3_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CopyObjectInput, CreateBucketInput,
    CreateMultipartUploadInput, DeleteBucketInput, DeleteObjectInput, DeleteObjectsInput,
    GetObjectAttributesInput, GetObjectInput, HeadBucketInput, HeadObjectInput,
    ListMultipartUploadsInput, ListObjectsInput, ListObjectsV2Input, ListPartsInput,
    PutObjectInput, UploadPartCopyInput, UploadPartInput,
};
use fsgate_s3_model::output::{
    CompleteMultipartUploadOutput, CopyObjectOutput, CreateMultipartUploadOutput,
    DeleteObjectsOutput, GetObjectAttributesOutput, GetObjectOutput, HeadBucketOutput,
    HeadObjectOutput, ListBucketsOutput, ListMultipartUploadsOutput, ListObjectsOutput,
    ListObjectsV2Output, ListPartsOutput, PutObjectOutput, UploadPartCopyOutput, UploadPartOutput,
};
use fsgate_s3_model::types::{Account, Bucket};

use crate::error::BackendResult;

/// The storage backend contract.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Release backend resources. Called once at gateway shutdown.
    async fn shutdown(&self);

    // -----------------------------------------------------------------------
    // Buckets
    // -----------------------------------------------------------------------

    /// List buckets visible to `owner`; admins see everything.
    async fn list_buckets(&self, owner: &str, is_admin: bool) -> BackendResult<ListBucketsOutput>;

    /// Check a bucket exists.
    async fn head_bucket(&self, input: HeadBucketInput) -> BackendResult<HeadBucketOutput>;

    /// Create a bucket directory and attach its initial ACL.
    async fn create_bucket(&self, acct: &Account, input: CreateBucketInput) -> BackendResult<()>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, input: DeleteBucketInput) -> BackendResult<()>;

    /// Rewrite the owner of a bucket's stored ACL.
    async fn change_bucket_owner(&self, bucket: &str, new_owner: &str) -> BackendResult<()>;

    /// Enumerate all buckets with their ACL owners.
    async fn list_buckets_and_owners(&self) -> BackendResult<Vec<Bucket>>;

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    /// List objects with v1 paging.
    async fn list_objects(&self, input: ListObjectsInput) -> BackendResult<ListObjectsOutput>;

    /// List objects with v2 paging.
    async fn list_objects_v2(
        &self,
        input: ListObjectsV2Input,
    ) -> BackendResult<ListObjectsV2Output>;

    /// Store an object (or a directory-object for trailing-`/` keys).
    async fn put_object(
        &self,
        acct: &Account,
        input: PutObjectInput,
    ) -> BackendResult<PutObjectOutput>;

    /// Stream an object's body into `writer` and return its metadata.
    async fn get_object(
        &self,
        input: GetObjectInput,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> BackendResult<GetObjectOutput>;

    /// Return object metadata without a body.
    async fn head_object(&self, input: HeadObjectInput) -> BackendResult<HeadObjectOutput>;

    /// Return selected object attributes, or the pending part list when
    /// only a multipart upload exists for the key.
    async fn get_object_attributes(
        &self,
        input: GetObjectAttributesInput,
    ) -> BackendResult<GetObjectAttributesOutput>;

    /// Server-side copy.
    async fn copy_object(
        &self,
        acct: &Account,
        input: CopyObjectInput,
    ) -> BackendResult<CopyObjectOutput>;

    /// Delete one object and prune incidental parent directories.
    async fn delete_object(&self, input: DeleteObjectInput) -> BackendResult<()>;

    /// Delete a batch of objects, reporting per-key outcomes.
    async fn delete_objects(&self, input: DeleteObjectsInput)
        -> BackendResult<DeleteObjectsOutput>;

    // -----------------------------------------------------------------------
    // Multipart uploads
    // -----------------------------------------------------------------------

    /// Initiate a multipart upload.
    async fn create_multipart_upload(
        &self,
        input: CreateMultipartUploadInput,
    ) -> BackendResult<CreateMultipartUploadOutput>;

    /// Store one part of an upload.
    async fn upload_part(
        &self,
        acct: &Account,
        input: UploadPartInput,
    ) -> BackendResult<UploadPartOutput>;

    /// Store one part by copying a range of an existing object.
    async fn upload_part_copy(
        &self,
        acct: &Account,
        input: UploadPartCopyInput,
    ) -> BackendResult<UploadPartCopyOutput>;

    /// List the parts of a pending upload.
    async fn list_parts(&self, input: ListPartsInput) -> BackendResult<ListPartsOutput>;

    /// List pending uploads in a bucket.
    async fn list_multipart_uploads(
        &self,
        input: ListMultipartUploadsInput,
    ) -> BackendResult<ListMultipartUploadsOutput>;

    /// Validate the part list and publish the assembled object.
    async fn complete_multipart_upload(
        &self,
        acct: &Account,
        input: CompleteMultipartUploadInput,
    ) -> BackendResult<CompleteMultipartUploadOutput>;

    /// Discard a pending upload.
    async fn abort_multipart_upload(&self, input: AbortMultipartUploadInput) -> BackendResult<()>;

    // -----------------------------------------------------------------------
    // Bucket ACL, tagging, policy
    // -----------------------------------------------------------------------

    /// Replace the bucket's ACL blob.
    async fn put_bucket_acl(&self, bucket: &str, acl: &[u8]) -> BackendResult<()>;

    /// Read the bucket's ACL blob (empty when never set).
    async fn get_bucket_acl(&self, bucket: &str) -> BackendResult<Vec<u8>>;

    /// Replace the bucket tag set; `None` clears it.
    async fn put_bucket_tagging(
        &self,
        bucket: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()>;

    /// Read the bucket tag set.
    async fn get_bucket_tagging(&self, bucket: &str) -> BackendResult<HashMap<String, String>>;

    /// Clear the bucket tag set.
    async fn delete_bucket_tagging(&self, bucket: &str) -> BackendResult<()>;

    /// Replace the bucket policy document; `None` clears it.
    async fn put_bucket_policy(&self, bucket: &str, policy: Option<&[u8]>) -> BackendResult<()>;

    /// Read the bucket policy document.
    async fn get_bucket_policy(&self, bucket: &str) -> BackendResult<Vec<u8>>;

    /// Clear the bucket policy document.
    async fn delete_bucket_policy(&self, bucket: &str) -> BackendResult<()>;

    // -----------------------------------------------------------------------
    // Object tagging
    // -----------------------------------------------------------------------

    /// Replace an object's tag set; `None` clears it.
    async fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()>;

    /// Read an object's tag set.
    async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<HashMap<String, String>>;

    /// Clear an object's tag set.
    async fn delete_object_tagging(&self, bucket: &str, key: &str) -> BackendResult<()>;

    // -----------------------------------------------------------------------
    // Object lock
    // -----------------------------------------------------------------------

    /// Replace the bucket's object lock configuration. Requires lock to
    /// have been enabled when the bucket was created.
    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &[u8],
    ) -> BackendResult<()>;

    /// Read the bucket's object lock configuration.
    async fn get_object_lock_configuration(&self, bucket: &str) -> BackendResult<Vec<u8>>;

    /// Set an object's retention blob.
    async fn put_object_retention(
        &self,
        bucket: &str,
        key: &str,
        retention: &[u8],
    ) -> BackendResult<()>;

    /// Read an object's retention blob.
    async fn get_object_retention(&self, bucket: &str, key: &str) -> BackendResult<Vec<u8>>;

    /// Set an object's legal-hold flag.
    async fn put_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        status: bool,
    ) -> BackendResult<()>;

    /// Read an object's legal-hold flag.
    async fn get_object_legal_hold(&self, bucket: &str, key: &str) -> BackendResult<bool>;
}
