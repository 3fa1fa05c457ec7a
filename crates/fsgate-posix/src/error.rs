//! Backend error types.
//!
//! [`BackendError`] is the domain error enum for every backend operation.
//! Client and precondition failures map one-to-one onto S3 error codes;
//! unexpected syscall failures are wrapped with context into
//! [`BackendError::Internal`] and surface as `InternalError` without
//! leaking filesystem paths to clients.

use std::io;

use fsgate_s3_model::error::{S3Error, S3ErrorCode};

/// Convenience result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Domain error for the filesystem backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The specified bucket does not exist.
    #[error("no such bucket: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The requested bucket name is already taken.
    #[error("bucket already exists: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The bucket is not empty and cannot be deleted.
    #[error("bucket not empty: {bucket}")]
    BucketNotEmpty {
        /// The bucket name that is not empty.
        bucket: String,
    },

    /// The bucket name is not a valid directory name.
    #[error("invalid bucket name: {name}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
    },

    /// The specified key does not exist.
    #[error("no such key: {key}")]
    NoSuchKey {
        /// The key that was not found.
        key: String,
    },

    /// The specified multipart upload does not exist.
    #[error("no such upload: {upload_id}")]
    NoSuchUpload {
        /// The upload id that was not found.
        upload_id: String,
    },

    /// A part in a complete-multipart request is missing or mismatched.
    #[error("invalid part: {message}")]
    InvalidPart {
        /// What failed to validate.
        message: String,
    },

    /// The part-number marker is not an integer.
    #[error("invalid part number marker: {marker}")]
    InvalidPartNumberMarker {
        /// The rejected marker.
        marker: String,
    },

    /// The requested byte range is not satisfiable.
    #[error("invalid range")]
    InvalidRange,

    /// The copy source is malformed or missing.
    #[error("invalid copy source")]
    InvalidCopySource,

    /// The copy destination is invalid (for example, identical to the source).
    #[error("invalid copy destination")]
    InvalidCopyDest,

    /// A directory object cannot carry a data payload.
    #[error("directory object cannot contain data")]
    DirectoryObjectContainsData,

    /// The object path is occupied by a directory.
    #[error("existing object path is a directory")]
    ExistingObjectIsDirectory,

    /// The account's disk quota would be exceeded.
    #[error("disk quota exceeded")]
    QuotaExceeded,

    /// The bucket has no stored policy.
    #[error("no bucket policy for: {bucket}")]
    NoSuchBucketPolicy {
        /// The bucket without a policy.
        bucket: String,
    },

    /// The bucket or object has no stored tag set.
    #[error("tagging not found")]
    TaggingNotFound,

    /// Object lock configuration writes require lock enabled at creation.
    #[error("object lock configuration not allowed")]
    ObjectLockConfigurationNotAllowed,

    /// The bucket has no object lock configuration.
    #[error("object lock configuration not found")]
    ObjectLockConfigurationNotFound,

    /// Retention or legal hold requires an enabled bucket lock configuration.
    #[error("bucket is missing a valid object lock configuration")]
    InvalidBucketObjectLockConfiguration,

    /// The object carries no retention or legal hold state.
    #[error("no object lock configuration on object")]
    NoSuchObjectLockConfiguration,

    /// A tag key or value is invalid.
    #[error("invalid tag: {message}")]
    InvalidTag {
        /// What failed to validate.
        message: String,
    },

    /// The request is malformed.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What is malformed.
        message: String,
    },

    /// Unexpected failure, wrapped with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BackendError {
    /// The S3 error code this error maps to.
    #[must_use]
    pub fn s3_code(&self) -> S3ErrorCode {
        match self {
            Self::NoSuchBucket { .. } => S3ErrorCode::NoSuchBucket,
            Self::BucketAlreadyExists { .. } => S3ErrorCode::BucketAlreadyExists,
            Self::BucketNotEmpty { .. } => S3ErrorCode::BucketNotEmpty,
            Self::InvalidBucketName { .. } => S3ErrorCode::InvalidBucketName,
            Self::NoSuchKey { .. } => S3ErrorCode::NoSuchKey,
            Self::NoSuchUpload { .. } => S3ErrorCode::NoSuchUpload,
            Self::InvalidPart { .. } => S3ErrorCode::InvalidPart,
            Self::InvalidPartNumberMarker { .. } => S3ErrorCode::InvalidPartNumberMarker,
            Self::InvalidRange => S3ErrorCode::InvalidRange,
            Self::InvalidCopySource => S3ErrorCode::InvalidCopySource,
            Self::InvalidCopyDest => S3ErrorCode::InvalidCopyDest,
            Self::DirectoryObjectContainsData => S3ErrorCode::DirectoryObjectContainsData,
            Self::ExistingObjectIsDirectory => S3ErrorCode::ExistingObjectIsDirectory,
            Self::QuotaExceeded => S3ErrorCode::QuotaExceeded,
            Self::NoSuchBucketPolicy { .. } => S3ErrorCode::NoSuchBucketPolicy,
            Self::TaggingNotFound => S3ErrorCode::BucketTaggingNotFound,
            Self::ObjectLockConfigurationNotAllowed => {
                S3ErrorCode::ObjectLockConfigurationNotAllowed
            }
            Self::ObjectLockConfigurationNotFound => S3ErrorCode::ObjectLockConfigurationNotFound,
            Self::InvalidBucketObjectLockConfiguration => {
                S3ErrorCode::InvalidBucketObjectLockConfiguration
            }
            Self::NoSuchObjectLockConfiguration => S3ErrorCode::NoSuchObjectLockConfiguration,
            Self::InvalidTag { .. } => S3ErrorCode::InvalidTag,
            Self::InvalidRequest { .. } => S3ErrorCode::InvalidRequest,
            Self::Internal(_) => S3ErrorCode::InternalError,
        }
    }

    /// Convert into the wire error value handed to the frontend.
    ///
    /// Internal errors are flattened to a generic message; the wrapped
    /// context stays on the backend side for logging.
    #[must_use]
    pub fn into_s3_error(self) -> S3Error {
        let code = self.s3_code();
        let message = match &self {
            Self::Internal(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        S3Error::with_message(code, message)
    }
}

impl From<BackendError> for S3Error {
    fn from(err: BackendError) -> Self {
        err.into_s3_error()
    }
}

/// Whether an io error is the disk-quota errno.
#[must_use]
pub(crate) fn is_quota(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EDQUOT)
}

/// Whether an io error is ENOTEMPTY (non-empty directory).
#[must_use]
pub(crate) fn is_not_empty(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOTEMPTY)
}

/// Classify an io error from a data write: quota errors keep their S3
/// identity, the rest wrap with context.
pub(crate) fn classify_write(err: io::Error, context: &str) -> BackendError {
    if is_quota(&err) {
        BackendError::QuotaExceeded
    } else {
        BackendError::Internal(anyhow::Error::new(err).context(context.to_owned()))
    }
}
