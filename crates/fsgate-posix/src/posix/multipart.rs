//! Multipart upload engine.
//!
//! Uploads stage under `<bucket>/.sgwtmp/multipart/<sha256(key)>/<uploadId>/`
//! with one file per part. The hashed container carries the original key
//! under the `objname` attribute so listings can recover it; several
//! uploads for the same key share one container. Completion validates the
//! client's part list in full, assembles the parts into one staged file,
//! and publishes it with the composite etag — nothing in the namespace
//! changes until every check passes.

use std::io::SeekFrom;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};
use uuid::Uuid;

use fsgate_s3_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CreateMultipartUploadInput,
    ListMultipartUploadsInput, ListPartsInput, UploadPartCopyInput, UploadPartInput,
};
use fsgate_s3_model::output::{
    CompleteMultipartUploadOutput, CreateMultipartUploadOutput, ListMultipartUploadsOutput,
    ListPartsOutput, UploadPartCopyOutput, UploadPartOutput,
};
use fsgate_s3_model::types::{Account, CopyObjectResult, Part, Upload};

use crate::checksums::{copy_with_md5, multipart_etag};
use crate::error::{classify_write, BackendError, BackendResult};
use crate::fsutil::{self, META_TMP_DIR, META_TMP_MULTIPART_DIR};
use crate::posix::object::{file_mtime, parse_copy_source, parse_object_range, stat_object};
use crate::posix::{meta_internal, Posix, ETAG_KEY, OBJNAME_KEY};
use crate::tmpfile::StagedFile;

/// Page size used when the caller does not supply `max-uploads`.
const DEFAULT_MAX_UPLOADS: i32 = 1000;

impl Posix {
    pub(crate) async fn create_multipart_upload(
        &self,
        input: CreateMultipartUploadInput,
    ) -> BackendResult<CreateMultipartUploadOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        // Directory objects cannot be assembled from parts.
        if input.key.ends_with('/') {
            return Err(BackendError::DirectoryObjectContainsData);
        }

        let upload_id = Uuid::new_v4().to_string();
        let container = container_rel(&input.key);
        let upload_rel = format!("{container}/{upload_id}");
        let upload_path = bucket_dir.join(&upload_rel);

        fsutil::mkdir_all(&upload_path, None)
            .map_err(|e| classify_write(e, "create upload directory"))?;

        // Map the hashed container back to the original key. On failure,
        // remove only this upload; the container may still serve siblings.
        if let Err(err) = self.metadata_store().store(
            &input.bucket,
            &container,
            OBJNAME_KEY,
            input.key.as_bytes(),
        ) {
            self.discard_upload(&bucket_dir, &input.bucket, &container, &upload_id)
                .await;
            return Err(meta_internal(err, "set objname attribute"));
        }

        if let Err(err) = self.store_user_metadata(&input.bucket, &upload_rel, &input.metadata) {
            self.discard_upload(&bucket_dir, &input.bucket, &container, &upload_id)
                .await;
            return Err(err);
        }

        debug!(
            bucket = %input.bucket,
            key = %input.key,
            upload_id = %upload_id,
            "create_multipart_upload completed"
        );

        Ok(CreateMultipartUploadOutput {
            bucket: input.bucket,
            key: input.key,
            upload_id,
        })
    }

    pub(crate) async fn upload_part(
        &self,
        acct: &Account,
        input: UploadPartInput,
    ) -> BackendResult<UploadPartOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let container = self
            .check_upload_exists(&bucket_dir, &input.key, &input.upload_id)
            .await?;
        let part_rel = format!("{container}/{}/{}", input.upload_id, input.part_number);

        let mut staged = StagedFile::create(
            &bucket_dir.join(&container),
            input.content_length,
            self.chown_ids(acct),
        )?;

        let mut body = input.body.into_reader();
        let (_written, etag) = copy_with_md5(&mut body, staged.file_mut())
            .await
            .map_err(|e| classify_write(e, "write part data"))?;

        staged.publish(&bucket_dir.join(&part_rel)).await?;

        self.metadata_store()
            .store(&input.bucket, &part_rel, ETAG_KEY, etag.as_bytes())
            .map_err(|e| meta_internal(e, "set etag attribute"))?;

        debug!(
            bucket = %input.bucket,
            upload_id = %input.upload_id,
            part_number = input.part_number,
            "upload_part completed"
        );

        Ok(UploadPartOutput { etag })
    }

    pub(crate) async fn upload_part_copy(
        &self,
        acct: &Account,
        input: UploadPartCopyInput,
    ) -> BackendResult<UploadPartCopyOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let container = self
            .check_upload_exists(&bucket_dir, &input.key, &input.upload_id)
            .await?;
        let part_rel = format!("{container}/{}/{}", input.upload_id, input.part_number);

        let (src_bucket, src_key) = parse_copy_source(&input.copy_source)?;
        self.stat_bucket(&src_bucket).await?;

        let src_dir = self.bucket_dir(&src_bucket)?;
        let src_path = fsutil::object_path(&src_dir, &src_key)?;
        let src_meta = stat_object(&src_path, &src_key).await?;
        let src_size = i64::try_from(src_meta.len()).unwrap_or(i64::MAX);

        let (start, length) = match input.copy_source_range.as_deref() {
            Some(range) => parse_object_range(src_size, range)?,
            None => (0, src_meta.len()),
        };

        let mut staged = StagedFile::create(
            &bucket_dir.join(&container),
            i64::try_from(length).unwrap_or(i64::MAX),
            self.chown_ids(acct),
        )?;

        let mut src_file = tokio::fs::File::open(&src_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BackendError::NoSuchKey {
                    key: src_key.clone(),
                }
            } else {
                BackendError::Internal(anyhow::Error::new(e).context("open source object"))
            }
        })?;
        src_file
            .seek(SeekFrom::Start(start))
            .await
            .map_err(|e| BackendError::Internal(anyhow::Error::new(e).context("seek source")))?;

        let mut section = src_file.take(length);
        let (_written, etag) = copy_with_md5(&mut section, staged.file_mut())
            .await
            .map_err(|e| classify_write(e, "copy part data"))?;

        let part_path = bucket_dir.join(&part_rel);
        staged.publish(&part_path).await?;

        self.metadata_store()
            .store(&input.bucket, &part_rel, ETAG_KEY, etag.as_bytes())
            .map_err(|e| meta_internal(e, "set etag attribute"))?;

        let part_meta = tokio::fs::metadata(&part_path)
            .await
            .map_err(|e| BackendError::Internal(anyhow::Error::new(e).context("stat part")))?;

        debug!(
            bucket = %input.bucket,
            upload_id = %input.upload_id,
            part_number = input.part_number,
            source = %input.copy_source,
            "upload_part_copy completed"
        );

        Ok(UploadPartCopyOutput {
            copy_part_result: CopyObjectResult {
                etag,
                last_modified: file_mtime(&part_meta),
            },
        })
    }

    pub(crate) async fn list_parts(&self, input: ListPartsInput) -> BackendResult<ListPartsOutput> {
        let marker = match input.part_number_marker.as_deref() {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| BackendError::InvalidPartNumberMarker {
                    marker: raw.to_owned(),
                })?,
        };
        let max_parts = input.max_parts.unwrap_or(0);

        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let container = self
            .check_upload_exists(&bucket_dir, &input.key, &input.upload_id)
            .await?;
        let upload_rel = format!("{container}/{}", input.upload_id);

        let mut parts = Vec::new();
        let mut entries = match tokio::fs::read_dir(bucket_dir.join(&upload_rel)).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchUpload {
                    upload_id: input.upload_id,
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("readdir upload"),
                ));
            }
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("readdir upload"))
        })? {
            // Part files are named by their number; anything else is
            // in-flight staging.
            let Some(part_number) = entry.file_name().to_str().and_then(|n| n.parse::<i32>().ok())
            else {
                continue;
            };
            if part_number <= marker {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };

            let part_rel = format!("{upload_rel}/{part_number}");
            parts.push(Part {
                part_number,
                etag: self.attr_or_empty(&input.bucket, &part_rel, ETAG_KEY),
                size: i64::try_from(meta.len()).unwrap_or(i64::MAX),
                last_modified: file_mtime(&meta),
            });
        }

        parts.sort_by_key(|p| p.part_number);

        let full_len = parts.len();
        if max_parts > 0 && full_len > max_parts as usize {
            parts.truncate(max_parts as usize);
        }
        let is_truncated = parts.len() != full_len;
        let next_part_number_marker = parts.last().map_or(0, |p| p.part_number);

        Ok(ListPartsOutput {
            bucket: input.bucket,
            key: input.key,
            upload_id: input.upload_id,
            part_number_marker: marker,
            next_part_number_marker,
            max_parts,
            is_truncated,
            parts,
        })
    }

    pub(crate) async fn list_multipart_uploads(
        &self,
        input: ListMultipartUploadsInput,
    ) -> BackendResult<ListMultipartUploadsOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let prefix = input.prefix.unwrap_or_default();
        let delimiter = input.delimiter.unwrap_or_default();
        let key_marker = input.key_marker.unwrap_or_default();
        let upload_id_marker = input.upload_id_marker.unwrap_or_default();
        let max_uploads = input.max_uploads.unwrap_or(DEFAULT_MAX_UPLOADS);

        let mut uploads = Vec::new();
        let mut upload_id_marker_found = false;

        for container in read_dir_names(&bucket_dir.join(META_TMP_MULTIPART_DIR)).await {
            let container_rel = format!("{META_TMP_MULTIPART_DIR}/{container}");
            // Recover the original key; skip containers missing it.
            let Ok(objname) =
                self.metadata_store()
                    .retrieve(&input.bucket, &container_rel, OBJNAME_KEY)
            else {
                continue;
            };
            let key = String::from_utf8_lossy(&objname).into_owned();
            if !key.starts_with(&prefix) {
                continue;
            }

            for upload_id in read_dir_names(&bucket_dir.join(&container_rel)).await {
                let upload_path = bucket_dir.join(&container_rel).join(&upload_id);
                let Ok(meta) = tokio::fs::metadata(&upload_path).await else {
                    continue;
                };
                if !meta.is_dir() {
                    continue;
                }
                if upload_id == upload_id_marker {
                    upload_id_marker_found = true;
                }
                uploads.push(Upload {
                    key: key.clone(),
                    upload_id,
                    initiated: file_mtime(&meta),
                });
            }
        }

        uploads.sort_by(|a, b| a.key.cmp(&b.key));

        let key_marker_pos = if key_marker.is_empty() {
            None
        } else {
            uploads.iter().position(|u| u.key == key_marker)
        };

        // A supplied marker that matches nothing yields an empty page with
        // the markers echoed.
        if (!upload_id_marker.is_empty() && !upload_id_marker_found)
            || (!key_marker.is_empty() && key_marker_pos.is_none())
        {
            return Ok(ListMultipartUploadsOutput {
                bucket: input.bucket,
                delimiter,
                key_marker,
                upload_id_marker,
                max_uploads,
                prefix,
                ..ListMultipartUploadsOutput::default()
            });
        }

        let start = key_marker_pos.map_or(0, |pos| pos + 1);
        let mut page = Vec::new();
        let mut is_truncated = false;
        for upload in &uploads[start..] {
            if max_uploads <= 0 {
                break;
            }
            // Compatibility: with both markers set, uploads below the
            // upload-id marker are dropped regardless of their key.
            if !key_marker.is_empty()
                && !upload_id_marker.is_empty()
                && upload.upload_id < upload_id_marker
            {
                continue;
            }
            if page.len() == max_uploads as usize {
                is_truncated = true;
                break;
            }
            page.push(upload.clone());
        }

        let (next_key_marker, next_upload_id_marker) = if is_truncated {
            page.last()
                .map(|u| (u.key.clone(), u.upload_id.clone()))
                .unwrap_or_default()
        } else {
            (String::new(), String::new())
        };

        Ok(ListMultipartUploadsOutput {
            bucket: input.bucket,
            delimiter,
            key_marker,
            upload_id_marker,
            next_key_marker,
            next_upload_id_marker,
            max_uploads,
            is_truncated,
            prefix,
            uploads: page,
        })
    }

    pub(crate) async fn complete_multipart_upload(
        &self,
        acct: &Account,
        input: CompleteMultipartUploadInput,
    ) -> BackendResult<CompleteMultipartUploadOutput> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        if input.parts.is_empty() {
            return Err(BackendError::InvalidRequest {
                message: "at least one part is required".to_owned(),
            });
        }

        let container = self
            .check_upload_exists(&bucket_dir, &input.key, &input.upload_id)
            .await?;
        let upload_rel = format!("{container}/{}", input.upload_id);

        // Validate the full part list before touching the namespace: every
        // part must exist with a matching etag, and all but the last must
        // share the first part's size.
        let last = input.parts.len() - 1;
        let mut first_size = 0i64;
        let mut total_size = 0i64;
        for (i, part) in input.parts.iter().enumerate() {
            let part_rel = format!("{upload_rel}/{}", part.part_number);
            let meta = match tokio::fs::symlink_metadata(bucket_dir.join(&part_rel)).await {
                Ok(meta) => meta,
                Err(_) => {
                    return Err(BackendError::InvalidPart {
                        message: format!("part {} not found", part.part_number),
                    });
                }
            };
            let size = i64::try_from(meta.len()).unwrap_or(i64::MAX);

            if i == 0 {
                first_size = size;
            }
            total_size += size;
            if i < last && size != first_size {
                return Err(BackendError::InvalidPart {
                    message: format!("part {} size mismatch", part.part_number),
                });
            }

            let stored = self.attr_or_empty(&input.bucket, &part_rel, ETAG_KEY);
            if stored != part.etag.trim_matches('"') {
                return Err(BackendError::InvalidPart {
                    message: format!("part {} etag mismatch", part.part_number),
                });
            }
        }

        let chown = self.chown_ids(acct);
        let mut staged =
            StagedFile::create(&bucket_dir.join(META_TMP_DIR), total_size, chown)?;

        for part in &input.parts {
            let part_path = bucket_dir.join(&upload_rel).join(part.part_number.to_string());
            let mut part_file = tokio::fs::File::open(&part_path).await.map_err(|e| {
                BackendError::Internal(
                    anyhow::Error::new(e).context(format!("open part {}", part.part_number)),
                )
            })?;
            tokio::io::copy(&mut part_file, staged.file_mut())
                .await
                .map_err(|e| classify_write(e, "assemble parts"))?;
        }

        let path = fsutil::object_path(&bucket_dir, &input.key)?;
        if let Some(parent) = path.parent() {
            fsutil::mkdir_all(parent, chown)
                .map_err(|_| BackendError::ExistingObjectIsDirectory)?;
        }

        staged.publish(&path).await?;

        // The rename replaced any previous inode; start the attribute set
        // clean before restoring the preserved metadata.
        if let Err(err) = self.metadata_store().delete_all(&input.bucket, &input.key) {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(meta_internal(err, "clear previous attributes"));
        }

        // Metadata preserved from initiation moves onto the final object.
        let mut user_metadata = std::collections::HashMap::new();
        self.load_user_metadata(&input.bucket, &upload_rel, &mut user_metadata);
        if let Err(err) = self.store_user_metadata(&input.bucket, &input.key, &user_metadata) {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(err);
        }

        let etags: Vec<&str> = input.parts.iter().map(|p| p.etag.as_str()).collect();
        let etag = multipart_etag(&etags);
        if let Err(err) =
            self.metadata_store()
                .store(&input.bucket, &input.key, ETAG_KEY, etag.as_bytes())
        {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(meta_internal(err, "set etag attribute"));
        }

        self.discard_upload(&bucket_dir, &input.bucket, &container, &input.upload_id)
            .await;

        debug!(
            bucket = %input.bucket,
            key = %input.key,
            upload_id = %input.upload_id,
            parts = input.parts.len(),
            etag = %etag,
            "complete_multipart_upload completed"
        );

        Ok(CompleteMultipartUploadOutput {
            bucket: input.bucket,
            key: input.key,
            etag,
        })
    }

    pub(crate) async fn abort_multipart_upload(
        &self,
        input: AbortMultipartUploadInput,
    ) -> BackendResult<()> {
        let bucket_dir = self.bucket_dir(&input.bucket)?;
        self.stat_bucket(&input.bucket).await?;

        let container = self
            .check_upload_exists(&bucket_dir, &input.key, &input.upload_id)
            .await?;

        self.discard_upload(&bucket_dir, &input.bucket, &container, &input.upload_id)
            .await;

        debug!(
            bucket = %input.bucket,
            key = %input.key,
            upload_id = %input.upload_id,
            "abort_multipart_upload completed"
        );
        Ok(())
    }

    /// Verify the upload directory exists; returns the container path
    /// relative to the bucket.
    pub(crate) async fn check_upload_exists(
        &self,
        bucket_dir: &Path,
        key: &str,
        upload_id: &str,
    ) -> BackendResult<String> {
        let container = container_rel(key);
        match tokio::fs::metadata(bucket_dir.join(&container).join(upload_id)).await {
            Ok(meta) if meta.is_dir() => Ok(container),
            Ok(_) => Err(BackendError::NoSuchUpload {
                upload_id: upload_id.to_owned(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BackendError::NoSuchUpload {
                    upload_id: upload_id.to_owned(),
                })
            }
            Err(err) => Err(BackendError::Internal(
                anyhow::Error::new(err).context("stat upload"),
            )),
        }
    }

    /// The first outstanding upload id for a key, with its container path.
    ///
    /// Used by the head-part and object-attributes paths, which address
    /// pending uploads by key alone.
    pub(crate) async fn retrieve_upload_id(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<(String, String)> {
        let bucket_dir = self.bucket_dir(bucket)?;
        let container = container_rel(key);

        let mut names = read_dir_names(&bucket_dir.join(&container)).await;
        names.sort();
        match names.into_iter().next() {
            Some(upload_id) => Ok((upload_id, container)),
            None => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
        }
    }

    /// Remove one upload's directory and attributes; the shared container
    /// goes too when no sibling uploads remain.
    async fn discard_upload(
        &self,
        bucket_dir: &Path,
        bucket: &str,
        container: &str,
        upload_id: &str,
    ) {
        let upload_rel = format!("{container}/{upload_id}");
        if let Err(err) = tokio::fs::remove_dir_all(bucket_dir.join(&upload_rel)).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(upload = %upload_rel, error = %err, "failed to remove upload directory");
            }
        }
        let _ = self.metadata_store().delete_all(bucket, &upload_rel);

        // Succeeds only when no sibling uploads share the container.
        if tokio::fs::remove_dir(bucket_dir.join(container)).await.is_ok() {
            let _ = self.metadata_store().delete_all(bucket, container);
        }
    }
}

/// Container path (relative to the bucket) for a key's multipart uploads.
fn container_rel(key: &str) -> String {
    format!(
        "{META_TMP_MULTIPART_DIR}/{}",
        fsutil::multipart_container(key)
    )
}

/// Names of subdirectories, sorted; missing or unreadable directories
/// yield an empty list. Skips non-directories, which filters out in-flight
/// staging files sharing the container.
async fn read_dir_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    names.sort();
    names
}
