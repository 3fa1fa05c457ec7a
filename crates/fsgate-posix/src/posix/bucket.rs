//! Bucket lifecycle and ownership operations.

use chrono::{DateTime, Utc};
use tracing::debug;

use fsgate_s3_model::input::{CreateBucketInput, DeleteBucketInput, HeadBucketInput};
use fsgate_s3_model::output::{HeadBucketOutput, ListBucketsOutput};
use fsgate_s3_model::types::{Account, Acl, Bucket, BucketEntry, BucketLockConfig};

use crate::error::{is_not_empty, BackendError, BackendResult};
use crate::fsutil::META_TMP_DIR;
use crate::posix::{meta_internal, Posix, ACL_KEY, BUCKET_LOCK_KEY};

impl Posix {
    pub(crate) async fn head_bucket(
        &self,
        input: HeadBucketInput,
    ) -> BackendResult<HeadBucketOutput> {
        self.stat_bucket(&input.bucket).await?;
        Ok(HeadBucketOutput {})
    }

    pub(crate) async fn create_bucket(
        &self,
        acct: &Account,
        input: CreateBucketInput,
    ) -> BackendResult<()> {
        let dir = self.bucket_dir(&input.bucket)?;

        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BackendError::BucketAlreadyExists {
                    bucket: input.bucket,
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("mkdir bucket"),
                ));
            }
        }

        if let Some((uid, gid)) = self.chown_ids(acct) {
            std::os::unix::fs::chown(&dir, Some(uid), Some(gid)).map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("chown bucket"))
            })?;
        }

        self.metadata_store()
            .store(&input.bucket, "", ACL_KEY, &input.acl)
            .map_err(|e| meta_internal(e, "set acl"))?;

        if input.object_lock_enabled_for_bucket {
            let lock = BucketLockConfig {
                enabled: true,
                created_at: Some(Utc::now()),
            };
            let blob = serde_json::to_vec(&lock).map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("serialize bucket lock"))
            })?;
            self.metadata_store()
                .store(&input.bucket, "", BUCKET_LOCK_KEY, &blob)
                .map_err(|e| meta_internal(e, "set default bucket lock"))?;
        }

        debug!(bucket = %input.bucket, "create_bucket completed");
        Ok(())
    }

    pub(crate) async fn delete_bucket(&self, input: DeleteBucketInput) -> BackendResult<()> {
        let dir = self.bucket_dir(&input.bucket)?;

        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchBucket {
                    bucket: input.bucket,
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("readdir bucket"),
                ));
            }
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("readdir bucket"))
        })? {
            names.push(entry.file_name());
        }

        // Internal state as the sole remaining child does not make the
        // bucket non-empty.
        if names.len() == 1 && names[0] == META_TMP_DIR {
            match tokio::fs::remove_dir_all(dir.join(META_TMP_DIR)).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(BackendError::Internal(
                        anyhow::Error::new(err).context("remove temp dir"),
                    ));
                }
            }
        }

        match tokio::fs::remove_dir(&dir).await {
            Ok(()) => {}
            Err(err) if is_not_empty(&err) => {
                return Err(BackendError::BucketNotEmpty {
                    bucket: input.bucket,
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NoSuchBucket {
                    bucket: input.bucket,
                });
            }
            Err(err) => {
                return Err(BackendError::Internal(
                    anyhow::Error::new(err).context("remove bucket"),
                ));
            }
        }

        self.metadata_store()
            .delete_all(&input.bucket, "")
            .map_err(|e| meta_internal(e, "remove bucket attributes"))?;

        debug!(bucket = %input.bucket, "delete_bucket completed");
        Ok(())
    }

    pub(crate) async fn list_buckets(
        &self,
        owner: &str,
        is_admin: bool,
    ) -> BackendResult<ListBucketsOutput> {
        let mut buckets = Vec::new();

        for (name, modified) in self.root_dirs().await? {
            if is_admin {
                buckets.push(BucketEntry {
                    name,
                    creation_date: modified,
                });
                continue;
            }

            // Non-admin callers only see buckets their account owns.
            match self.bucket_acl(&name) {
                Ok(acl) if acl.owner == owner => buckets.push(BucketEntry {
                    name,
                    creation_date: modified,
                }),
                _ => {}
            }
        }

        buckets.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ListBucketsOutput {
            buckets,
            owner: owner.to_owned(),
        })
    }

    pub(crate) async fn change_bucket_owner(
        &self,
        bucket: &str,
        new_owner: &str,
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;

        let mut acl = self.bucket_acl(bucket)?;
        acl.owner = new_owner.to_owned();

        let blob = serde_json::to_vec(&acl).map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("serialize acl"))
        })?;
        self.metadata_store()
            .store(bucket, "", ACL_KEY, &blob)
            .map_err(|e| meta_internal(e, "set acl"))?;

        debug!(bucket, new_owner, "change_bucket_owner completed");
        Ok(())
    }

    pub(crate) async fn list_buckets_and_owners(&self) -> BackendResult<Vec<Bucket>> {
        let mut buckets = Vec::new();

        for (name, _modified) in self.root_dirs().await? {
            let owner = self.bucket_acl(&name).map(|acl| acl.owner).unwrap_or_default();
            buckets.push(Bucket { name, owner });
        }

        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    /// Enumerate bucket directories at the root with their mtimes.
    ///
    /// Dot-prefixed names are internal (the sidecar metadata tree), never
    /// buckets.
    async fn root_dirs(&self) -> BackendResult<Vec<(String, DateTime<Utc>)>> {
        let mut dirs = Vec::new();
        let mut entries = tokio::fs::read_dir(self.root()).await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("readdir buckets"))
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("readdir buckets"))
        })? {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            // Skip entries that fail to stat or are not directories.
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_dir() {
                continue;
            }
            let modified = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            dirs.push((name, modified));
        }

        Ok(dirs)
    }

    /// Load and parse the bucket's stored ACL.
    pub(crate) fn bucket_acl(&self, bucket: &str) -> BackendResult<Acl> {
        let blob = self
            .metadata_store()
            .retrieve(bucket, "", ACL_KEY)
            .map_err(|e| meta_internal(e, "get acl"))?;
        serde_json::from_slice(&blob)
            .map_err(|e| BackendError::Internal(anyhow::Error::new(e).context("parse acl")))
    }
}
