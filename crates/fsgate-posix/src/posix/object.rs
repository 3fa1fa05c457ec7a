//! Object CRUD and listing operations.

use std::collections::HashMap;
use std::io::SeekFrom;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use tokio::io::{AsyncSeekExt, AsyncWrite};
use tracing::debug;

use fsgate_s3_model::input::{
    CopyObjectInput, DeleteObjectInput, DeleteObjectsInput, GetObjectAttributesInput,
    GetObjectInput, HeadObjectInput, ListObjectsInput, ListObjectsV2Input, ListPartsInput,
    PutObjectInput,
};
use fsgate_s3_model::output::{
    CopyObjectOutput, DeleteObjectsOutput, GetObjectAttributesOutput, GetObjectOutput,
    HeadObjectOutput, ListObjectsOutput, ListObjectsV2Output, PutObjectOutput,
};
use fsgate_s3_model::types::{
    Account, CopyObjectResult, DeleteError, DeletedObject, Object, ObjectLockRetention,
    ObjectPart, ObjectParts,
};
use fsgate_s3_model::StreamingBlob;

use crate::checksums::{copy_with_md5, EMPTY_MD5};
use crate::error::{classify_write, BackendError, BackendResult};
use crate::fsutil::{self, META_TMP_DIR};
use crate::meta::MetaError;
use crate::posix::{
    meta_internal, Posix, CONTENT_ENCODING_KEY, CONTENT_TYPE_KEY, ETAG_KEY, META_PREFIX,
};
use crate::tmpfile::StagedFile;
use crate::walker::{self, WalkResults};

/// Page size used when the caller does not supply `max-keys`.
const DEFAULT_MAX_KEYS: i32 = 1000;

// S3 caps on tag keys and values.
const MAX_TAG_KEY_LEN: usize = 128;
const MAX_TAG_VALUE_LEN: usize = 256;

impl Posix {
    pub(crate) async fn put_object(
        &self,
        acct: &Account,
        input: PutObjectInput,
    ) -> BackendResult<PutObjectOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        // Parse the tagging header up front so a bad tag set fails before
        // any data is staged.
        let tags = input.tagging.as_deref().map(parse_tagging).transpose()?;

        let chown = self.chown_ids(acct);
        let path = fsutil::object_path(&bucket_dir, &input.key)?;

        if input.key.ends_with('/') {
            // Directory object. Posix directories cannot hold data.
            if input.content_length != 0 {
                return Err(BackendError::DirectoryObjectContainsData);
            }

            fsutil::mkdir_all(&path, chown)
                .map_err(|e| classify_write(e, "create directory object"))?;

            self.store_user_metadata(&input.bucket, &input.key, &input.metadata)?;

            // The etag attribute marks the directory as intentional.
            self.metadata_store()
                .store(&input.bucket, &input.key, ETAG_KEY, EMPTY_MD5.as_bytes())
                .map_err(|e| meta_internal(e, "set etag attribute"))?;

            debug!(bucket = %input.bucket, key = %input.key, "put directory object");
            return Ok(PutObjectOutput {
                etag: EMPTY_MD5.to_owned(),
            });
        }

        if let Ok(existing) = tokio::fs::metadata(&path).await {
            if existing.is_dir() {
                return Err(BackendError::ExistingObjectIsDirectory);
            }
        }

        let mut staged =
            StagedFile::create(&bucket_dir.join(META_TMP_DIR), input.content_length, chown)?;

        let mut body = input.body.into_reader();
        let (_written, etag) = copy_with_md5(&mut body, staged.file_mut())
            .await
            .map_err(|e| classify_write(e, "write object data"))?;

        if let Some(parent) = path.parent() {
            // A file in the way of a parent directory surfaces here.
            fsutil::mkdir_all(parent, chown)
                .map_err(|_| BackendError::ExistingObjectIsDirectory)?;
        }

        staged.publish(&path).await?;

        // The rename replaced any previous inode; drop whatever attribute
        // state the store still holds for the path so overwrites start
        // clean in the sidecar variant too.
        self.metadata_store()
            .delete_all(&input.bucket, &input.key)
            .map_err(|e| meta_internal(e, "clear previous attributes"))?;

        self.store_user_metadata(&input.bucket, &input.key, &input.metadata)?;

        if let Some(content_type) = &input.content_type {
            self.metadata_store()
                .store(
                    &input.bucket,
                    &input.key,
                    CONTENT_TYPE_KEY,
                    content_type.as_bytes(),
                )
                .map_err(|e| meta_internal(e, "set content type"))?;
        }
        if let Some(content_encoding) = &input.content_encoding {
            self.metadata_store()
                .store(
                    &input.bucket,
                    &input.key,
                    CONTENT_ENCODING_KEY,
                    content_encoding.as_bytes(),
                )
                .map_err(|e| meta_internal(e, "set content encoding"))?;
        }

        if let Some(tags) = tags {
            self.put_object_tagging(&input.bucket, &input.key, Some(tags))
                .await?;
        }

        if input.object_lock_legal_hold == Some(true) {
            self.put_object_legal_hold(&input.bucket, &input.key, true)
                .await?;
        }
        if let Some(mode) = &input.object_lock_mode {
            let retention = ObjectLockRetention {
                mode: mode.clone(),
                retain_until_date: input.object_lock_retain_until_date,
            };
            let blob = serde_json::to_vec(&retention).map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("serialize retention"))
            })?;
            self.put_object_retention(&input.bucket, &input.key, &blob)
                .await?;
        }

        self.metadata_store()
            .store(&input.bucket, &input.key, ETAG_KEY, etag.as_bytes())
            .map_err(|e| meta_internal(e, "set etag attribute"))?;

        debug!(bucket = %input.bucket, key = %input.key, etag = %etag, "put_object completed");
        Ok(PutObjectOutput { etag })
    }

    pub(crate) async fn get_object(
        &self,
        input: GetObjectInput,
        writer: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> BackendResult<GetObjectOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let path = fsutil::object_path(&bucket_dir, &input.key)?;
        let meta = stat_object(&path, &input.key).await?;

        let mut user_metadata = HashMap::new();
        let (content_type, content_encoding) =
            self.load_user_metadata(&input.bucket, &input.key, &mut user_metadata);
        let etag = self.attr_or_empty(&input.bucket, &input.key, ETAG_KEY);
        let tag_count = self.object_tag_count(&input.bucket, &input.key)?;
        let last_modified = Some(file_mtime(&meta));

        if meta.is_dir() {
            // Directory objects are always zero length; no file to open.
            return Ok(GetObjectOutput {
                accept_ranges: "bytes".to_owned(),
                content_length: 0,
                content_range: None,
                content_type,
                content_encoding,
                etag,
                last_modified,
                metadata: user_metadata,
                tag_count,
            });
        }

        let size = i64::try_from(meta.len()).unwrap_or(i64::MAX);
        // An absent range reads the whole object, like `bytes=0-`.
        let (start, length) = match input.range.as_deref() {
            Some(range) => parse_object_range(size, range)?,
            None => (0, u64::try_from(size).unwrap_or(0)),
        };
        let content_range = input.range.as_ref().map(|_| {
            let end = start + length.saturating_sub(1);
            format!("bytes {start}-{end}/{size}")
        });

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchKey { key: input.key });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("open object"),
                ));
            }
        };
        file.seek(SeekFrom::Start(start)).await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("seek object"))
        })?;

        let mut section = tokio::io::AsyncReadExt::take(file, length);
        tokio::io::copy(&mut section, writer).await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("copy object data"))
        })?;

        Ok(GetObjectOutput {
            accept_ranges: "bytes".to_owned(),
            content_length: i64::try_from(length).unwrap_or(i64::MAX),
            content_range,
            content_type,
            content_encoding,
            etag,
            last_modified,
            metadata: user_metadata,
            tag_count,
        })
    }

    pub(crate) async fn head_object(
        &self,
        input: HeadObjectInput,
    ) -> BackendResult<HeadObjectOutput> {
        if let Some(part_number) = input.part_number {
            return self.head_object_part(&input.bucket, &input.key, part_number).await;
        }

        self.stat_bucket(&input.bucket).await?;
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        let path = fsutil::object_path(&bucket_dir, &input.key)?;
        let meta = stat_object(&path, &input.key).await?;

        let mut user_metadata = HashMap::new();
        let (content_type, content_encoding) =
            self.load_user_metadata(&input.bucket, &input.key, &mut user_metadata);
        let etag = self.attr_or_empty(&input.bucket, &input.key, ETAG_KEY);

        let object_lock_legal_hold = self
            .get_object_legal_hold(&input.bucket, &input.key)
            .await
            .ok();

        let (object_lock_mode, object_lock_retain_until_date) = match self
            .get_object_retention(&input.bucket, &input.key)
            .await
        {
            Ok(blob) => serde_json::from_slice::<ObjectLockRetention>(&blob)
                .map(|r| (Some(r.mode), r.retain_until_date))
                .unwrap_or((None, None)),
            Err(_) => (None, None),
        };

        let size = if meta.is_dir() {
            0
        } else {
            i64::try_from(meta.len()).unwrap_or(i64::MAX)
        };

        Ok(HeadObjectOutput {
            content_length: size,
            content_type,
            content_encoding,
            etag,
            last_modified: Some(file_mtime(&meta)),
            metadata: user_metadata,
            parts_count: None,
            object_lock_mode,
            object_lock_retain_until_date,
            object_lock_legal_hold,
        })
    }

    /// Head one part of a still-pending multipart upload for the key.
    async fn head_object_part(
        &self,
        bucket: &str,
        key: &str,
        part_number: i32,
    ) -> BackendResult<HeadObjectOutput> {
        let (upload_id, container) = self.retrieve_upload_id(bucket, key).await?;

        let upload_dir = format!("{container}/{upload_id}");
        let bucket_dir = self.bucket_dir(bucket)?;
        let upload_path = bucket_dir.join(&upload_dir);

        let mut parts_count = 0i32;
        let mut entries = match tokio::fs::read_dir(&upload_path).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchKey {
                    key: key.to_owned(),
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("read parts"),
                ));
            }
        };
        while let Some(_entry) = entries.next_entry().await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("read parts"))
        })? {
            parts_count += 1;
        }

        let part_path = format!("{upload_dir}/{part_number}");
        let meta = match tokio::fs::metadata(bucket_dir.join(&part_path)).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::InvalidPart {
                    message: format!("part {part_number} not found"),
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("stat part"),
                ));
            }
        };

        let etag = self.attr_or_empty(bucket, &part_path, ETAG_KEY);

        Ok(HeadObjectOutput {
            content_length: i64::try_from(meta.len()).unwrap_or(i64::MAX),
            etag,
            last_modified: Some(file_mtime(&meta)),
            parts_count: Some(parts_count),
            ..HeadObjectOutput::default()
        })
    }

    pub(crate) async fn get_object_attributes(
        &self,
        input: GetObjectAttributesInput,
    ) -> BackendResult<GetObjectAttributesOutput> {
        match self
            .head_object(HeadObjectInput {
                bucket: input.bucket.clone(),
                key: input.key.clone(),
                part_number: None,
            })
            .await
        {
            Ok(head) => {
                return Ok(GetObjectAttributesOutput {
                    etag: Some(head.etag),
                    last_modified: head.last_modified,
                    object_size: Some(head.content_length),
                    object_parts: None,
                });
            }
            Err(BackendError::NoSuchKey { .. }) => {}
            Err(err) => return Err(err),
        }

        // The key is absent; report the in-progress upload instead.
        let (upload_id, _container) = self
            .retrieve_upload_id(&input.bucket, &input.key)
            .await?;

        let parts = self
            .list_parts(ListPartsInput {
                bucket: input.bucket,
                key: input.key,
                upload_id,
                part_number_marker: input.part_number_marker,
                max_parts: input.max_parts,
            })
            .await?;

        Ok(GetObjectAttributesOutput {
            object_parts: Some(ObjectParts {
                is_truncated: parts.is_truncated,
                max_parts: parts.max_parts,
                part_number_marker: parts.part_number_marker,
                next_part_number_marker: parts.next_part_number_marker,
                parts: parts
                    .parts
                    .iter()
                    .map(|p| ObjectPart {
                        part_number: p.part_number,
                        size: p.size,
                    })
                    .collect(),
            }),
            ..GetObjectAttributesOutput::default()
        })
    }

    pub(crate) async fn copy_object(
        &self,
        acct: &Account,
        input: CopyObjectInput,
    ) -> BackendResult<CopyObjectOutput> {
        let (src_bucket, src_key) = parse_copy_source(&input.copy_source)?;

        self.stat_bucket(&src_bucket).await?;
        self.stat_bucket(&input.bucket).await?;

        let src_dir = self.bucket_dir(&src_bucket)?;
        let src_path = fsutil::object_path(&src_dir, &src_key)?;
        let src_meta = stat_object(&src_path, &src_key).await?;
        if src_meta.is_dir() {
            return Err(BackendError::NoSuchKey { key: src_key });
        }

        let mut src_metadata = HashMap::new();
        let (src_content_type, src_content_encoding) =
            self.load_user_metadata(&src_bucket, &src_key, &mut src_metadata);

        if src_bucket == input.bucket && src_key == input.key {
            if src_metadata == input.metadata {
                return Err(BackendError::InvalidCopyDest);
            }

            // Same path, new metadata: rewrite the user attributes in place.
            for name in src_metadata.keys() {
                self.metadata_store()
                    .delete(&input.bucket, &input.key, &format!("{META_PREFIX}{name}"))
                    .map_err(|e| meta_internal(e, "delete user attribute"))?;
            }
            self.store_user_metadata(&input.bucket, &input.key, &input.metadata)?;

            let etag = self.attr_or_empty(&input.bucket, &input.key, ETAG_KEY);
            return Ok(CopyObjectOutput {
                copy_object_result: CopyObjectResult {
                    etag,
                    last_modified: file_mtime(&src_meta),
                },
            });
        }

        let src_file = tokio::fs::File::open(&src_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackendError::NoSuchKey {
                    key: src_key.clone(),
                }
            } else {
                BackendError::Internal(anyhow::Error::new(e).context("open source object"))
            }
        })?;

        let put = self
            .put_object(
                acct,
                PutObjectInput {
                    bucket: input.bucket.clone(),
                    key: input.key.clone(),
                    body: StreamingBlob::new(src_file),
                    content_length: i64::try_from(src_meta.len()).unwrap_or(i64::MAX),
                    content_type: src_content_type,
                    content_encoding: src_content_encoding,
                    metadata: src_metadata,
                    ..PutObjectInput::default()
                },
            )
            .await?;

        let dst_dir = self.bucket_dir(&input.bucket)?;
        let dst_meta = tokio::fs::metadata(fsutil::object_path(&dst_dir, &input.key)?)
            .await
            .map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("stat destination object"))
            })?;

        debug!(
            src_bucket = %src_bucket,
            src_key = %src_key,
            dst_bucket = %input.bucket,
            dst_key = %input.key,
            "copy_object completed"
        );

        Ok(CopyObjectOutput {
            copy_object_result: CopyObjectResult {
                etag: put.etag,
                last_modified: file_mtime(&dst_meta),
            },
        })
    }

    pub(crate) async fn delete_object(&self, input: DeleteObjectInput) -> BackendResult<()> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let path = fsutil::object_path(&bucket_dir, &input.key)?;

        let removed = match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Directory objects unlink with rmdir.
            Err(err) if err.raw_os_error() == Some(libc::EISDIR) => {
                tokio::fs::remove_dir(&path).await
            }
            Err(err) => Err(err),
        };
        match removed {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchKey { key: input.key });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("delete object"),
                ));
            }
        }

        self.metadata_store()
            .delete_all(&input.bucket, &input.key)
            .map_err(|e| meta_internal(e, "delete object attributes"))?;

        self.remove_parents(&input.bucket, &bucket_dir, &input.key);

        debug!(bucket = %input.bucket, key = %input.key, "delete_object completed");
        Ok(())
    }

    /// Prune parent directories created incidentally by object PUTs.
    ///
    /// Walks upward from the deleted key; a parent carrying an etag
    /// attribute was PUT as a directory-object and stops the walk, as does
    /// the bucket root or any non-empty directory.
    fn remove_parents(&self, bucket: &str, bucket_dir: &std::path::Path, key: &str) {
        let mut current = key;
        while let Some(parent) = fsutil::key_parent(current) {
            if self
                .metadata_store()
                .retrieve(bucket, parent, ETAG_KEY)
                .is_ok()
            {
                break;
            }
            if std::fs::remove_dir(bucket_dir.join(parent)).is_err() {
                break;
            }
            let _ = self.metadata_store().delete_all(bucket, parent);
            current = parent;
        }
    }

    pub(crate) async fn delete_objects(
        &self,
        input: DeleteObjectsInput,
    ) -> BackendResult<DeleteObjectsOutput> {
        let mut deleted = Vec::new();
        let mut errors = Vec::new();

        for object in input.objects {
            let result = self
                .delete_object(DeleteObjectInput {
                    bucket: input.bucket.clone(),
                    key: object.key.clone(),
                })
                .await;

            match result {
                Ok(()) => deleted.push(DeletedObject { key: object.key }),
                Err(err) => {
                    let code = err.s3_code().as_str().to_owned();
                    let message = err.into_s3_error().message().to_owned();
                    errors.push(DeleteError {
                        key: object.key,
                        code,
                        message,
                    });
                }
            }
        }

        debug!(
            bucket = %input.bucket,
            deleted = deleted.len(),
            errors = errors.len(),
            "delete_objects completed"
        );

        Ok(DeleteObjectsOutput { deleted, errors })
    }

    pub(crate) async fn list_objects(
        &self,
        input: ListObjectsInput,
    ) -> BackendResult<ListObjectsOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let prefix = input.prefix.unwrap_or_default();
        let delimiter = input.delimiter.unwrap_or_default();
        let marker = input.marker.unwrap_or_default();
        let max_keys = input.max_keys.unwrap_or(DEFAULT_MAX_KEYS);

        let results = self.walk_bucket(&bucket_dir, &input.bucket, &prefix, &delimiter, &marker, max_keys)?;

        Ok(ListObjectsOutput {
            common_prefixes: results.common_prefixes,
            contents: results.objects,
            delimiter,
            is_truncated: results.truncated,
            marker,
            max_keys,
            name: input.bucket,
            next_marker: results.next_marker,
            prefix,
        })
    }

    pub(crate) async fn list_objects_v2(
        &self,
        input: ListObjectsV2Input,
    ) -> BackendResult<ListObjectsV2Output> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let prefix = input.prefix.unwrap_or_default();
        let delimiter = input.delimiter.unwrap_or_default();
        let max_keys = input.max_keys.unwrap_or(DEFAULT_MAX_KEYS);

        // The effective start is the greater of the two when both the
        // continuation token and start-after are present.
        let marker = match (&input.continuation_token, &input.start_after) {
            (Some(token), Some(start_after)) => {
                if start_after > token {
                    start_after.clone()
                } else {
                    token.clone()
                }
            }
            (Some(token), None) => token.clone(),
            (None, Some(start_after)) => start_after.clone(),
            (None, None) => String::new(),
        };

        let results = self.walk_bucket(&bucket_dir, &input.bucket, &prefix, &delimiter, &marker, max_keys)?;
        let key_count = i32::try_from(results.objects.len() + results.common_prefixes.len())
            .unwrap_or(i32::MAX);

        Ok(ListObjectsV2Output {
            common_prefixes: results.common_prefixes,
            contents: results.objects,
            delimiter,
            is_truncated: results.truncated,
            continuation_token: marker,
            max_keys,
            name: input.bucket,
            next_continuation_token: results.next_marker,
            prefix,
            key_count,
        })
    }

    fn walk_bucket(
        &self,
        bucket_dir: &std::path::Path,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        marker: &str,
        max_keys: i32,
    ) -> BackendResult<WalkResults> {
        walker::walk(
            bucket_dir,
            prefix,
            delimiter,
            marker,
            max_keys,
            self.file_to_obj(bucket),
            &[META_TMP_DIR],
        )
    }

    /// Per-entry walker callback: files become objects (etag attribute or
    /// empty), directories become directory-objects only when they carry
    /// an etag attribute.
    fn file_to_obj<'a>(&'a self, bucket: &'a str) -> impl walker::GetObjFn + 'a {
        move |path, meta, is_dir| {
            if is_dir {
                return match self.metadata_store().retrieve(bucket, path, ETAG_KEY) {
                    Ok(etag) => Ok(Some(Object {
                        key: format!("{path}/"),
                        etag: String::from_utf8_lossy(&etag).into_owned(),
                        size: 0,
                        last_modified: file_mtime(meta),
                    })),
                    // Incidental structure, not an object.
                    Err(MetaError::NoSuchKey | MetaError::NotFound) => Ok(None),
                    Err(err) => Err(meta_internal(err, "get etag attribute")),
                };
            }

            let etag = match self.metadata_store().retrieve(bucket, path, ETAG_KEY) {
                Ok(etag) => String::from_utf8_lossy(&etag).into_owned(),
                Err(MetaError::NoSuchKey) => String::new(),
                Err(MetaError::NotFound) => return Ok(None),
                Err(err) => return Err(meta_internal(err, "get etag attribute")),
            };

            Ok(Some(Object {
                key: path.to_owned(),
                etag,
                size: i64::try_from(meta.len()).unwrap_or(i64::MAX),
                last_modified: file_mtime(meta),
            }))
        }
    }

    /// Number of tags on the object, `None` when no tag set exists.
    fn object_tag_count(&self, bucket: &str, key: &str) -> BackendResult<Option<i32>> {
        match self.attr_tags(bucket, key) {
            Ok(tags) => Ok(Some(i32::try_from(tags.len()).unwrap_or(i32::MAX))),
            Err(BackendError::TaggingNotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Stat an object path, mapping absence to `NoSuchKey`.
pub(crate) async fn stat_object(
    path: &std::path::Path,
    key: &str,
) -> BackendResult<std::fs::Metadata> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(BackendError::NoSuchKey {
            key: key.to_owned(),
        }),
        Err(err) => Err(BackendError::Internal(
            anyhow::Error::new(err).context("stat object"),
        )),
    }
}

/// Filesystem mtime as a UTC timestamp.
pub(crate) fn file_mtime(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Parse the `X-Amz-Tagging` header (`k=v&k=v`) into a tag map.
///
/// # Errors
///
/// Returns [`BackendError::InvalidTag`] for pieces without exactly one
/// `=` or keys/values beyond the S3 length caps (128/256).
pub(crate) fn parse_tagging(header: &str) -> BackendResult<HashMap<String, String>> {
    let mut tags = HashMap::new();
    if header.is_empty() {
        return Ok(tags);
    }

    for piece in header.split('&') {
        let mut parts = piece.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BackendError::InvalidTag {
                message: format!("malformed tag: {piece:?}"),
            });
        };
        if key.len() > MAX_TAG_KEY_LEN || value.len() > MAX_TAG_VALUE_LEN {
            return Err(BackendError::InvalidTag {
                message: "tag key or value too long".to_owned(),
            });
        }
        tags.insert(key.to_owned(), value.to_owned());
    }
    Ok(tags)
}

/// Parse `x-amz-copy-source` (`bucket/key`, optionally percent-encoded,
/// optional leading slash) into bucket and key.
pub(crate) fn parse_copy_source(source: &str) -> BackendResult<(String, String)> {
    let source = source.strip_prefix('/').unwrap_or(source);
    let (bucket, key) = source
        .split_once('/')
        .ok_or(BackendError::InvalidCopySource)?;
    if bucket.is_empty() || key.is_empty() {
        return Err(BackendError::InvalidCopySource);
    }

    let key = percent_decode_str(key)
        .decode_utf8()
        .map_err(|_| BackendError::InvalidCopySource)?
        .into_owned();

    Ok((bucket.to_owned(), key))
}

/// Parse an HTTP byte range against an object size, returning
/// `(start, length)`.
///
/// Supported forms: `bytes=N-M`, `bytes=N-`, `bytes=-N` (suffix). The
/// requested window must lie entirely within the object; any byte past
/// the end is unsatisfiable.
pub(crate) fn parse_object_range(size: i64, range: &str) -> BackendResult<(u64, u64)> {
    let size = u64::try_from(size).map_err(|_| BackendError::InvalidRange)?;
    let spec = range.strip_prefix("bytes=").ok_or(BackendError::InvalidRange)?;

    if size == 0 {
        return Err(BackendError::InvalidRange);
    }

    if let Some(suffix) = spec.strip_prefix('-') {
        // Last N bytes.
        let n: u64 = suffix.parse().map_err(|_| BackendError::InvalidRange)?;
        if n == 0 || n > size {
            return Err(BackendError::InvalidRange);
        }
        return Ok((size - n, n));
    }

    if let Some(from) = spec.strip_suffix('-') {
        let start: u64 = from.parse().map_err(|_| BackendError::InvalidRange)?;
        if start >= size {
            return Err(BackendError::InvalidRange);
        }
        return Ok((start, size - start));
    }

    let (start, end) = spec.split_once('-').ok_or(BackendError::InvalidRange)?;
    let start: u64 = start.parse().map_err(|_| BackendError::InvalidRange)?;
    let end: u64 = end.parse().map_err(|_| BackendError::InvalidRange)?;
    if start > end || end >= size {
        return Err(BackendError::InvalidRange);
    }
    Ok((start, end - start + 1))
}
