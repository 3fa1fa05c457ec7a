//! Bucket ACL, tagging, policy, and object-lock operations.
//!
//! Each of these is an opaque blob under a dedicated attribute key: PUT
//! replaces, a nil payload clears, and absent reads map to the operation's
//! S3 not-found shape.

use std::collections::HashMap;

use tracing::debug;

use fsgate_s3_model::types::BucketLockConfig;

use crate::error::{BackendError, BackendResult};
use crate::meta::MetaError;
use crate::posix::{
    meta_internal, Posix, ACL_KEY, BUCKET_LOCK_KEY, OBJECT_LEGAL_HOLD_KEY, OBJECT_RETENTION_KEY,
    POLICY_KEY, TAGGING_KEY,
};

impl Posix {
    // -----------------------------------------------------------------------
    // Bucket ACL
    // -----------------------------------------------------------------------

    pub(crate) async fn put_bucket_acl(&self, bucket: &str, acl: &[u8]) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;
        self.metadata_store()
            .store(bucket, "", ACL_KEY, acl)
            .map_err(|e| meta_internal(e, "set acl"))
    }

    pub(crate) async fn get_bucket_acl(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.stat_bucket(bucket).await?;
        match self.metadata_store().retrieve(bucket, "", ACL_KEY) {
            Ok(blob) => Ok(blob),
            // A bucket created out of band simply has no ACL yet.
            Err(MetaError::NoSuchKey) => Ok(Vec::new()),
            Err(err) => Err(meta_internal(err, "get acl")),
        }
    }

    // -----------------------------------------------------------------------
    // Bucket tagging
    // -----------------------------------------------------------------------

    pub(crate) async fn put_bucket_tagging(
        &self,
        bucket: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;

        let Some(tags) = tags else {
            return match self.metadata_store().delete(bucket, "", TAGGING_KEY) {
                Ok(()) | Err(MetaError::NoSuchKey) => Ok(()),
                Err(err) => Err(meta_internal(err, "remove tags")),
            };
        };

        let blob = serde_json::to_vec(&tags).map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("serialize tags"))
        })?;
        self.metadata_store()
            .store(bucket, "", TAGGING_KEY, &blob)
            .map_err(|e| meta_internal(e, "set tags"))
    }

    pub(crate) async fn get_bucket_tagging(
        &self,
        bucket: &str,
    ) -> BackendResult<HashMap<String, String>> {
        self.stat_bucket(bucket).await?;
        self.attr_tags(bucket, "")
    }

    pub(crate) async fn delete_bucket_tagging(&self, bucket: &str) -> BackendResult<()> {
        self.put_bucket_tagging(bucket, None).await
    }

    // -----------------------------------------------------------------------
    // Object tagging
    // -----------------------------------------------------------------------

    pub(crate) async fn put_object_tagging(
        &self,
        bucket: &str,
        key: &str,
        tags: Option<HashMap<String, String>>,
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;

        let Some(tags) = tags else {
            return match self.metadata_store().delete(bucket, key, TAGGING_KEY) {
                Ok(()) | Err(MetaError::NoSuchKey) => Ok(()),
                Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                    key: key.to_owned(),
                }),
                Err(err) => Err(meta_internal(err, "remove tags")),
            };
        };

        let blob = serde_json::to_vec(&tags).map_err(|e| {
            BackendError::Internal(anyhow::Error::new(e).context("serialize tags"))
        })?;
        match self.metadata_store().store(bucket, key, TAGGING_KEY, &blob) {
            Ok(()) => {
                debug!(bucket, key, count = tags.len(), "put_object_tagging completed");
                Ok(())
            }
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(err) => Err(meta_internal(err, "set tags")),
        }
    }

    pub(crate) async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<HashMap<String, String>> {
        self.stat_bucket(bucket).await?;
        self.attr_tags(bucket, key)
    }

    pub(crate) async fn delete_object_tagging(&self, bucket: &str, key: &str) -> BackendResult<()> {
        self.put_object_tagging(bucket, key, None).await
    }

    // -----------------------------------------------------------------------
    // Bucket policy
    // -----------------------------------------------------------------------

    pub(crate) async fn put_bucket_policy(
        &self,
        bucket: &str,
        policy: Option<&[u8]>,
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;

        let Some(policy) = policy else {
            return match self.metadata_store().delete(bucket, "", POLICY_KEY) {
                Ok(()) | Err(MetaError::NoSuchKey) => Ok(()),
                Err(err) => Err(meta_internal(err, "remove policy")),
            };
        };

        self.metadata_store()
            .store(bucket, "", POLICY_KEY, policy)
            .map_err(|e| meta_internal(e, "set policy"))
    }

    pub(crate) async fn get_bucket_policy(&self, bucket: &str) -> BackendResult<Vec<u8>> {
        self.stat_bucket(bucket).await?;
        match self.metadata_store().retrieve(bucket, "", POLICY_KEY) {
            Ok(blob) => Ok(blob),
            Err(MetaError::NoSuchKey) => Err(BackendError::NoSuchBucketPolicy {
                bucket: bucket.to_owned(),
            }),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchBucket {
                bucket: bucket.to_owned(),
            }),
            Err(err) => Err(meta_internal(err, "get bucket policy")),
        }
    }

    pub(crate) async fn delete_bucket_policy(&self, bucket: &str) -> BackendResult<()> {
        self.put_bucket_policy(bucket, None).await
    }

    // -----------------------------------------------------------------------
    // Object lock
    // -----------------------------------------------------------------------

    pub(crate) async fn put_object_lock_configuration(
        &self,
        bucket: &str,
        config: &[u8],
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;

        // Only buckets created with lock enabled may carry a configuration.
        let existing = self
            .bucket_lock_config(bucket)?
            .ok_or(BackendError::ObjectLockConfigurationNotAllowed)?;
        if !existing.enabled {
            return Err(BackendError::ObjectLockConfigurationNotAllowed);
        }

        self.metadata_store()
            .store(bucket, "", BUCKET_LOCK_KEY, config)
            .map_err(|e| meta_internal(e, "set object lock config"))
    }

    pub(crate) async fn get_object_lock_configuration(
        &self,
        bucket: &str,
    ) -> BackendResult<Vec<u8>> {
        self.stat_bucket(bucket).await?;
        match self.metadata_store().retrieve(bucket, "", BUCKET_LOCK_KEY) {
            Ok(blob) => Ok(blob),
            Err(MetaError::NoSuchKey) => Err(BackendError::ObjectLockConfigurationNotFound),
            Err(err) => Err(meta_internal(err, "get object lock config")),
        }
    }

    pub(crate) async fn put_object_retention(
        &self,
        bucket: &str,
        key: &str,
        retention: &[u8],
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;
        self.require_lock_enabled(bucket)?;

        match self
            .metadata_store()
            .store(bucket, key, OBJECT_RETENTION_KEY, retention)
        {
            Ok(()) => Ok(()),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(err) => Err(meta_internal(err, "set retention")),
        }
    }

    pub(crate) async fn get_object_retention(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<Vec<u8>> {
        self.stat_bucket(bucket).await?;
        match self
            .metadata_store()
            .retrieve(bucket, key, OBJECT_RETENTION_KEY)
        {
            Ok(blob) => Ok(blob),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(MetaError::NoSuchKey) => Err(BackendError::NoSuchObjectLockConfiguration),
            Err(err) => Err(meta_internal(err, "get retention")),
        }
    }

    pub(crate) async fn put_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
        status: bool,
    ) -> BackendResult<()> {
        self.stat_bucket(bucket).await?;
        self.require_lock_enabled(bucket)?;

        let state = [u8::from(status)];
        match self
            .metadata_store()
            .store(bucket, key, OBJECT_LEGAL_HOLD_KEY, &state)
        {
            Ok(()) => Ok(()),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(err) => Err(meta_internal(err, "set legal hold")),
        }
    }

    pub(crate) async fn get_object_legal_hold(
        &self,
        bucket: &str,
        key: &str,
    ) -> BackendResult<bool> {
        self.stat_bucket(bucket).await?;
        match self
            .metadata_store()
            .retrieve(bucket, key, OBJECT_LEGAL_HOLD_KEY)
        {
            Ok(blob) => Ok(blob.first() == Some(&1)),
            Err(MetaError::NotFound) => Err(BackendError::NoSuchKey {
                key: key.to_owned(),
            }),
            Err(MetaError::NoSuchKey) => Err(BackendError::NoSuchObjectLockConfiguration),
            Err(err) => Err(meta_internal(err, "get legal hold")),
        }
    }

    /// Parse the bucket's stored lock configuration, if any.
    fn bucket_lock_config(&self, bucket: &str) -> BackendResult<Option<BucketLockConfig>> {
        match self.metadata_store().retrieve(bucket, "", BUCKET_LOCK_KEY) {
            Ok(blob) => serde_json::from_slice(&blob).map(Some).map_err(|e| {
                BackendError::Internal(anyhow::Error::new(e).context("parse bucket lock config"))
            }),
            Err(MetaError::NoSuchKey) => Ok(None),
            Err(err) => Err(meta_internal(err, "get object lock config")),
        }
    }

    /// Per-object lock writes require the bucket-level lock to be enabled.
    fn require_lock_enabled(&self, bucket: &str) -> BackendResult<()> {
        match self.bucket_lock_config(bucket)? {
            Some(config) if config.enabled => Ok(()),
            _ => Err(BackendError::InvalidBucketObjectLockConfiguration),
        }
    }
}
