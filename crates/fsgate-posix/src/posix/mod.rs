//! The POSIX filesystem backend.
//!
//! [`Posix`] binds one backend instance to one filesystem root for the
//! process lifetime. The struct itself is stateless across requests apart
//! from the root path, the metadata store handle, and the chown policy
//! captured at construction; all consistency comes from filesystem-level
//! atomicity (single link/rename/unlink operations).
//!
//! Operations live in the submodules (`bucket`, `object`, `multipart`,
//! `attrs`) as inherent methods; the [`Backend`] impl at the bottom of this
//! module wires them to the trait.

mod attrs;
mod bucket;
mod multipart;
mod object;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tracing::{debug, info};

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
use crate::error::{BackendError, BackendResult};
use crate::fsutil;
use crate::meta::{MetaError, MetadataStore};

// Logical attribute keys the backend reads and writes.
pub(crate) const ACL_KEY: &str = "acl";
pub(crate) const ETAG_KEY: &str = "etag";
pub(crate) const POLICY_KEY: &str = "policy";
pub(crate) const BUCKET_LOCK_KEY: &str = "bucket-lock";
pub(crate) const OBJECT_RETENTION_KEY: &str = "object-retention";
pub(crate) const OBJECT_LEGAL_HOLD_KEY: &str = "object-legal-hold";
pub(crate) const TAGGING_KEY: &str = "X-Amz-Tagging";
pub(crate) const META_PREFIX: &str = "X-Amz-Meta.";
pub(crate) const CONTENT_TYPE_KEY: &str = "content-type";
pub(crate) const CONTENT_ENCODING_KEY: &str = "content-encoding";
pub(crate) const OBJNAME_KEY: &str = "objname";

/// Backend construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixOpts {
    /// Chown newly created files and directories to the account uid.
    pub chown_uid: bool,
    /// Chown newly created files and directories to the account gid.
    pub chown_gid: bool,
}

/// POSIX filesystem storage backend.
///
/// Buckets are directories directly under the root; objects are files (or
/// etag-marked directories) below them, keys split on `/`.
pub struct Posix {
    root: PathBuf,
    meta: Arc<dyn MetadataStore>,
    chown_uid: bool,
    chown_gid: bool,
    // Effective ids of the gateway process, read once at construction.
    euid: u32,
    egid: u32,
}

impl std::fmt::Debug for Posix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Posix")
            .field("root", &self.root)
            .field("chown_uid", &self.chown_uid)
            .field("chown_gid", &self.chown_gid)
            .finish_non_exhaustive()
    }
}

impl Posix {
    /// Bind a backend to a filesystem root.
    ///
    /// # Errors
    ///
    /// Fails when the root does not exist or is not a directory.
    pub fn new(
        root: impl Into<PathBuf>,
        meta: Arc<dyn MetadataStore>,
        opts: PosixOpts,
    ) -> BackendResult<Self> {
        let root = root.into();
        let root = root
            .canonicalize()
            .map_err(|e| BackendError::Internal(anyhow::Error::new(e).context("open root")))?;
        if !root.is_dir() {
            return Err(BackendError::Internal(anyhow::anyhow!(
                "root {} is not a directory",
                root.display()
            )));
        }

        info!(root = %root.display(), "posix backend initialized");

        Ok(Self {
            root,
            meta,
            chown_uid: opts.chown_uid,
            chown_gid: opts.chown_gid,
            euid: unsafe { libc::geteuid() },
            egid: unsafe { libc::getegid() },
        })
    }

    /// The filesystem root all paths resolve under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn metadata_store(&self) -> &dyn MetadataStore {
        self.meta.as_ref()
    }

    /// Validate the bucket name and map it to its directory.
    pub(crate) fn bucket_dir(&self, bucket: &str) -> BackendResult<PathBuf> {
        fsutil::validate_bucket_name(bucket)?;
        Ok(self.root.join(bucket))
    }

    /// Stat the bucket directory, mapping absence to `NoSuchBucket`.
    pub(crate) async fn stat_bucket(&self, bucket: &str) -> BackendResult<std::fs::Metadata> {
        let dir = self.bucket_dir(bucket)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(meta),
            Ok(_) => Err(BackendError::NoSuchBucket {
                bucket: bucket.to_owned(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BackendError::NoSuchBucket {
                    bucket: bucket.to_owned(),
                })
            }
            Err(err) => Err(BackendError::Internal(
                anyhow::Error::new(err).context("stat bucket"),
            )),
        }
    }

    /// The uid/gid new filesystem objects should be chowned to, or `None`
    /// when the configuration and account make chowning unnecessary.
    pub(crate) fn chown_ids(&self, acct: &Account) -> Option<(u32, u32)> {
        let mut uid = self.euid;
        let mut gid = self.egid;
        let mut needed = false;
        if self.chown_uid && acct.user_id != self.euid {
            uid = acct.user_id;
            needed = true;
        }
        if self.chown_gid && acct.group_id != self.egid {
            gid = acct.group_id;
            needed = true;
        }
        needed.then_some((uid, gid))
    }

    /// Retrieve an attribute, treating a missing attribute as an empty
    /// value (the etag convention for unmarked files).
    pub(crate) fn attr_or_empty(&self, bucket: &str, object: &str, key: &str) -> String {
        self.meta
            .retrieve(bucket, object, key)
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default()
    }

    /// Fill `map` with the object's user metadata and return the stored
    /// content type and encoding.
    pub(crate) fn load_user_metadata(
        &self,
        bucket: &str,
        object: &str,
        map: &mut HashMap<String, String>,
    ) -> (Option<String>, Option<String>) {
        if let Ok(names) = self.meta.list(bucket, object) {
            for name in names {
                let Some(short) = name.strip_prefix(META_PREFIX) else {
                    continue;
                };
                if let Ok(value) = self.meta.retrieve(bucket, object, &name) {
                    map.insert(
                        short.to_owned(),
                        String::from_utf8_lossy(&value).into_owned(),
                    );
                }
            }
        }

        let content_type = self
            .meta
            .retrieve(bucket, object, CONTENT_TYPE_KEY)
            .ok()
            .map(|b| String::from_utf8_lossy(&b).into_owned());
        let content_encoding = self
            .meta
            .retrieve(bucket, object, CONTENT_ENCODING_KEY)
            .ok()
            .map(|b| String::from_utf8_lossy(&b).into_owned());

        (content_type, content_encoding)
    }

    /// Store prefixed user metadata attributes on an object path.
    pub(crate) fn store_user_metadata(
        &self,
        bucket: &str,
        object: &str,
        metadata: &HashMap<String, String>,
    ) -> BackendResult<()> {
        for (name, value) in metadata {
            self.meta
                .store(
                    bucket,
                    object,
                    &format!("{META_PREFIX}{name}"),
                    value.as_bytes(),
                )
                .map_err(|e| meta_internal(e, "set user attribute"))?;
        }
        Ok(())
    }

    /// Read the object (or bucket, for `object = ""`) tag set.
    ///
    /// Missing path maps to `NoSuchKey`, missing attribute to the S3
    /// tagging-not-found shape.
    pub(crate) fn attr_tags(
        &self,
        bucket: &str,
        object: &str,
    ) -> BackendResult<HashMap<String, String>> {
        match self.meta.retrieve(bucket, object, TAGGING_KEY) {
            Ok(blob) => serde_json::from_slice(&blob).map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("parse tag set"))
            }),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: object.to_owned(),
            }),
            Err(MetaError::NoSuchKey) => Err(BackendError::TaggingNotFound),
            Err(err) => Err(meta_internal(err, "get tag set")),
        }
    }
}

/// Wrap a metadata-store failure as an internal error with context.
pub(crate) fn meta_internal(err: MetaError, context: &'static str) -> BackendError {
    BackendError::Internal(anyhow::Error::new(err).context(context))
}

#[async_trait]
impl Backend for Posix {
    fn name(&self) -> &'static str {
        "Posix Gateway"
    }

    async fn shutdown(&self) {
        debug!(root = %self.root.display(), "posix backend shut down");
    }

    async fn list_buckets(&self, owner: &str, is_admin: bool) -> BackendResult<ListBucketsOutput> {
        self.list_buckets(owner, is_admin).await
    }

    async fn head_bucket(&self, input: HeadBucketInput) -> BackendResult<HeadBucketOutput> {
        self.head_bucket(input).await
    }

    async fn create_bucket(&self, acct: &Account, input: CreateBucketInput) -> BackendResult<()> {
        self.create_bucket(acct, input).await
    }

    async fn delete_bucket(&self, input: DeleteBucketInput) -> BackendResult<()> {
        self.delete_bucket(input).await
    }

    async fn change_bucket_owner(&self, bucket: &str, new_owner: &str) -> BackendResult<()> {
        self.change_bucket_owner(bucket, new_owner).await
    }

    async fn list_buckets_and_owners(&self) -> BackendResult<Vec<Bucket>> {
        self.list_buckets_and_owners().await
    }

    async fn list_objects(&self, input: ListObjectsInput) -> BackendResult<ListObjectsOutput> {
        self.list_objects(input).await
    }

    async fn list_objects_v2(
        &self,
        input: ListObjectsV2Input,
    ) -> BackendResult<ListObjectsV2Output> {
        self.list_objects_v2(input).await
    }

    async fn put_object(
        &self,
        acct: &Account,
        input: PutObjectInput,
    ) -> BackendResult<PutObjectOutput> {
        self.put_object(acct, input).await
    }

    async fn get_object(
        &self,
        input: GetObjectInput,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> BackendResult<GetObjectOutput> {
        self.get_object(input, writer).await
    }

    async fn head_object(&self, input: HeadObjectInput) -> BackendResult<HeadObjectOutput> {
        self.head_object(input).await
    }

    async fn get_object_attributes(
        &self,
        input: GetObjectAttributesInput,
    ) -> BackendResult<GetObjectAttributesOutput> {
        self.get_object_attributes(input).await
    }

    async fn copy_object(
        &self,
        acct: &Account,
        input: CopyObjectInput,
    ) -> BackendResult<CopyObjectOutput> {
        self.copy_object(acct, input).await
    }

    async fn delete_object(&self, input: DeleteObjectInput) -> BackendResult<()> {
        self.delete_object(input).await
    }

    async fn delete_objects(
        &self,
        input: DeleteObjectsInput,
    ) -> BackendResult<DeleteObjectsOutput> {
        self.delete_objects(input).await
    }

    async fn create_multipart_upload(
        &self,
        input: CreateMultipartUploadInput,
    ) -> BackendResult<CreateMultipartUploadOutput> {
        self.create_multipart_upload(input).await
    }

    async fn upload_part(
        &self,
        acct: &Account,
        input: UploadPartInput,
    ) -> BackendResult<UploadPartOutput> {
        self.upload_part(acct, input).await
    }

    async fn upload_part_copy(
        &self,
        acct: &Account,
        input: UploadPartCopyInput,
    ) -> BackendResult<UploadPartCopyOutput> {
        self.upload_part_copy(acct, input).await
    }

    async fn list_parts(&self, input: ListPartsInput) -> BackendResult<ListPartsOutput> {
        self.list_parts(input).await
    }

    async fn list_multipart_uploads(
        &self,
        input: ListMultipartUploadsInput,
    ) -> BackendResult<ListMultipartUploadsOutput> {
        self.list_multipart_uploads(input).await
    }

    async fn complete_multipart_upload(
        &self,
        acct: &Account,
        input: CompleteMultipartUploadInput,
    ) -> BackendResult<CompleteMultipartUploadOutput> {
        self.complete_multipart_upload(acct, input).await
    }

    async fn abort_multipart_upload(&self, input: AbortMultipartUploadInput) -> BackendResult<()> {
        self.abort_multipart_upload(input).await
    }

    async fn put_bucket_acl(&self, bucket: &str, acl: &[u8]) -> BackendResult<()> {
        self.put_bucket_acl(bucket, acl).await
    }

    async fn get_bucket_acl(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.get_bucket_acl(bucket).await
    }

    async fn put_bucket_tagging(
        &self,
        bucket: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.put_bucket_tagging(bucket, tags).await
    }

    async fn get_bucket_tagging(&self, bucket: &str) -> BackendResult<HashMap<String, String>> {
        self.get_bucket_tagging(bucket).await
    }

    async fn delete_bucket_tagging(&self, bucket: &str) -> BackendResult<()> {
        self.delete_bucket_tagging(bucket).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: Option<&[u8]>) -> BackendResult<()> {
        self.put_bucket_policy(bucket, policy).await
    }

    async fn get_bucket_policy(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.get_bucket_policy(bucket).await
    }

    async fn delete_bucket_policy(&self, bucket: &str) -> BackendResult<()> {
        self.delete_bucket_policy(bucket).await
    }

    async fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.put_object_tagging(bucket, key, tags).await
    }

    async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<HashMap<String, String>> {
        self.get_object_tagging(bucket, key).await
    }

    async fn delete_object_tagging(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.delete_object_tagging(bucket, key).await
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &[u8],
    ) -> BackendResult<()> {
        self.put_object_lock_configuration(bucket, config).await
    }

    async fn get_object_lock_configuration(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.get_object_lock_configuration(bucket).await
    }

    async fn put_object_retention(
        &self,
        bucket: &str,
        key: &str,
        retention: &[u8],
    ) -> BackendResult<()> {
        self.put_object_retention(bucket, key, retention).await
    }

    async fn get_object_retention(&self, bucket: &str, key: &str) -> BackendResult<Vec<u8>> {
        self.get_object_retention(bucket, key).await
    }

    async fn put_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        status: bool,
    ) -> BackendResult<()> {
        self.put_object_legal_hold(bucket, key, status).await
    }

    async fn get_object_legal_hold(&self, bucket: &str, key: &str) -> BackendResult<bool> {
        self.get_object_legal_hold(bucket, key).await
    }
}
