//! ScoutFS backend variant.
//!
//! ScoutFS is a POSIX filesystem with archival tiering; the gateway runs
//! on it with the same on-disk layout as the plain POSIX backend. The
//! variant embeds [`Posix`] and delegates the whole [`Backend`] contract
//! to it — composition, not subclassing — so ScoutFS-specific behavior
//! (batched staging, offline-file handling) has a seam to land in without
//! touching the POSIX code paths.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

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

use crate::backend::Backend;
use crate::error::BackendResult;
use crate::meta::MetadataStore;
use crate::posix::{Posix, PosixOpts};

/// POSIX backend specialization for ScoutFS roots.
#[derive(Debug)]
pub struct ScoutFs {
    posix: Posix,
}

impl ScoutFs {
    /// Bind a backend to a ScoutFS filesystem root.
    ///
    /// # Errors
    ///
    /// Fails when the root does not exist or is not a directory.
    pub fn new(
        root: impl Into<std::path::PathBuf>,
        meta: Arc<dyn MetadataStore>,
        opts: PosixOpts,
    ) -> BackendResult<Self> {
        Ok(Self {
            posix: Posix::new(root, meta, opts)?,
        })
    }

    /// The filesystem root all paths resolve under.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.posix.root()
    }
}

#[async_trait]
impl Backend for ScoutFs {
    fn name(&self) -> &'static str {
        "ScoutFS Gateway"
    }

    async fn shutdown(&self) {
        Backend::shutdown(&self.posix).await;
    }

    async fn list_buckets(&self, owner: &str, is_admin: bool) -> BackendResult<ListBucketsOutput> {
        self.posix.list_buckets(owner, is_admin).await
    }

    async fn head_bucket(&self, input: HeadBucketInput) -> BackendResult<HeadBucketOutput> {
        self.posix.head_bucket(input).await
    }

    async fn create_bucket(&self, acct: &Account, input: CreateBucketInput) -> BackendResult<()> {
        self.posix.create_bucket(acct, input).await
    }

    async fn delete_bucket(&self, input: DeleteBucketInput) -> BackendResult<()> {
        self.posix.delete_bucket(input).await
    }

    async fn change_bucket_owner(&self, bucket: &str, new_owner: &str) -> BackendResult<()> {
        self.posix.change_bucket_owner(bucket, new_owner).await
    }

    async fn list_buckets_and_owners(&self) -> BackendResult<Vec<Bucket>> {
        self.posix.list_buckets_and_owners().await
    }

    async fn list_objects(&self, input: ListObjectsInput) -> BackendResult<ListObjectsOutput> {
        self.posix.list_objects(input).await
    }

    async fn list_objects_v2(
        &self,
        input: ListObjectsV2Input,
    ) -> BackendResult<ListObjectsV2Output> {
        self.posix.list_objects_v2(input).await
    }

    async fn put_object(
        &self,
        acct: &Account,
        input: PutObjectInput,
    ) -> BackendResult<PutObjectOutput> {
        self.posix.put_object(acct, input).await
    }

    async fn get_object(
        &self,
        input: GetObjectInput,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> BackendResult<GetObjectOutput> {
        self.posix.get_object(input, writer).await
    }

    async fn head_object(&self, input: HeadObjectInput) -> BackendResult<HeadObjectOutput> {
        self.posix.head_object(input).await
    }

    async fn get_object_attributes(
        &self,
        input: GetObjectAttributesInput,
    ) -> BackendResult<GetObjectAttributesOutput> {
        self.posix.get_object_attributes(input).await
    }

    async fn copy_object(
        &self,
        acct: &Account,
        input: CopyObjectInput,
    ) -> BackendResult<CopyObjectOutput> {
        self.posix.copy_object(acct, input).await
    }

    async fn delete_object(&self, input: DeleteObjectInput) -> BackendResult<()> {
        self.posix.delete_object(input).await
    }

    async fn delete_objects(
        &self,
        input: DeleteObjectsInput,
    ) -> BackendResult<DeleteObjectsOutput> {
        self.posix.delete_objects(input).await
    }

    async fn create_multipart_upload(
        &self,
        input: CreateMultipartUploadInput,
    ) -> BackendResult<CreateMultipartUploadOutput> {
        self.posix.create_multipart_upload(input).await
    }

    async fn upload_part(
        &self,
        acct: &Account,
        input: UploadPartInput,
    ) -> BackendResult<UploadPartOutput> {
        self.posix.upload_part(acct, input).await
    }

    async fn upload_part_copy(
        &self,
        acct: &Account,
        input: UploadPartCopyInput,
    ) -> BackendResult<UploadPartCopyOutput> {
        self.posix.upload_part_copy(acct, input).await
    }

    async fn list_parts(&self, input: ListPartsInput) -> BackendResult<ListPartsOutput> {
        self.posix.list_parts(input).await
    }

    async fn list_multipart_uploads(
        &self,
        input: ListMultipartUploadsInput,
    ) -> BackendResult<ListMultipartUploadsOutput> {
        self.posix.list_multipart_uploads(input).await
    }

    async fn complete_multipart_upload(
        &self,
        acct: &Account,
        input: CompleteMultipartUploadInput,
    ) -> BackendResult<CompleteMultipartUploadOutput> {
        self.posix.complete_multipart_upload(acct, input).await
    }

    async fn abort_multipart_upload(&self, input: AbortMultipartUploadInput) -> BackendResult<()> {
        self.posix.abort_multipart_upload(input).await
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &[u8]) -> BackendResult<()> {
        self.posix.put_bucket_acl(bucket, acl).await
    }

    async fn get_bucket_acl(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.posix.get_bucket_acl(bucket).await
    }

    async fn put_bucket_tagging(
        &self,
        bucket: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.posix.put_bucket_tagging(bucket, tags).await
    }

    async fn get_bucket_tagging(&self, bucket: &str) -> BackendResult<HashMap<String, String>> {
        self.posix.get_bucket_tagging(bucket).await
    }

    async fn delete_bucket_tagging(&self, bucket: &str) -> BackendResult<()> {
        self.posix.delete_bucket_tagging(bucket).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: Option<&[u8]>) -> BackendResult<()> {
        self.posix.put_bucket_policy(bucket, policy).await
    }

    async fn get_bucket_policy(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.posix.get_bucket_policy(bucket).await
    }

    async fn delete_bucket_policy(&self, bucket: &str) -> BackendResult<()> {
        self.posix.delete_bucket_policy(bucket).await
    }

    async fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.posix.put_object_tagging(bucket, key, tags).await
    }

    async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<HashMap<String, String>> {
        self.posix.get_object_tagging(bucket, key).await
    }

    async fn delete_object_tagging(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.posix.delete_object_tagging(bucket, key).await
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &[u8],
    ) -> BackendResult<()> {
        self.posix.put_object_lock_configuration(bucket, config).await
    }

    async fn get_object_lock_configuration(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.posix.get_object_lock_configuration(bucket).await
    }

    async fn put_object_retention(
        &self,
        bucket: &str,
        key: &str,
        retention: &[u8],
    ) -> BackendResult<()> {
        self.posix.put_object_retention(bucket, key, retention).await
    }

    async fn get_object_retention(&self, bucket: &str, key: &str) -> BackendResult<Vec<u8>> {
        self.posix.get_object_retention(bucket, key).await
    }

    async fn put_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        status: bool,
    ) -> BackendResult<()> {
        self.posix.put_object_legal_hold(bucket, key, status).await
    }

    async fn get_object_legal_hold(&self, bucket: &str, key: &str) -> BackendResult<bool> {
        self.posix.get_object_legal_hold(bucket, key).await
    }
}
