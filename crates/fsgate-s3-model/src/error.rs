//! S3 wire error values.
//!
//! [`S3ErrorCode`] enumerates the error codes a fsgate backend can produce;
//! [`S3Error`] pairs a code with a human-readable message. The frontend
//! serializes these into the S3 XML error shape; backends construct them
//! through their own domain error types.

use std::fmt;

/// Well-known S3 error codes produced by the storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// The specified bucket does not exist.
    NoSuchBucket,
    /// The specified key does not exist.
    NoSuchKey,
    /// The requested bucket name is not available.
    BucketAlreadyExists,
    /// The bucket you tried to delete is not empty.
    BucketNotEmpty,
    /// The specified bucket name is not valid.
    InvalidBucketName,
    /// One or more of the specified parts could not be found or did not match.
    InvalidPart,
    /// The part-number marker is not an integer.
    InvalidPartNumberMarker,
    /// The requested range is not satisfiable.
    InvalidRange,
    /// The copy source is malformed.
    InvalidCopySource,
    /// The copy destination is invalid (for example, identical to the source).
    InvalidCopyDest,
    /// A directory object cannot carry a data payload.
    DirectoryObjectContainsData,
    /// The object path is occupied by a directory.
    ExistingObjectIsDirectory,
    /// The account's disk quota would be exceeded.
    QuotaExceeded,
    /// The specified multipart upload does not exist.
    NoSuchUpload,
    /// The bucket policy does not exist.
    NoSuchBucketPolicy,
    /// The bucket tag set does not exist.
    BucketTaggingNotFound,
    /// Object lock configuration cannot be set on this bucket.
    ObjectLockConfigurationNotAllowed,
    /// The object lock configuration was not found.
    ObjectLockConfigurationNotFound,
    /// The bucket is missing a valid object lock configuration.
    InvalidBucketObjectLockConfiguration,
    /// The object has no lock configuration (retention or legal hold).
    NoSuchObjectLockConfiguration,
    /// A tag key or value is invalid.
    InvalidTag,
    /// The request is malformed.
    InvalidRequest,
    /// An internal error occurred.
    InternalError,
}

impl S3ErrorCode {
    /// Return the error code as the string used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidPart => "InvalidPart",
            Self::InvalidPartNumberMarker => "InvalidPartNumberMarker",
            Self::InvalidRange => "InvalidRange",
            Self::InvalidCopySource => "InvalidCopySource",
            Self::InvalidCopyDest => "InvalidCopyDest",
            Self::DirectoryObjectContainsData => "DirectoryObjectContainsData",
            Self::ExistingObjectIsDirectory => "ExistingObjectIsDirectory",
            Self::QuotaExceeded => "QuotaExceeded",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::BucketTaggingNotFound => "BucketTaggingNotFound",
            Self::ObjectLockConfigurationNotAllowed => "ObjectLockConfigurationNotAllowed",
            Self::ObjectLockConfigurationNotFound => "ObjectLockConfigurationNotFound",
            Self::InvalidBucketObjectLockConfiguration => "InvalidBucketObjectLockConfiguration",
            Self::NoSuchObjectLockConfiguration => "NoSuchObjectLockConfiguration",
            Self::InvalidTag => "InvalidTag",
            Self::InvalidRequest => "InvalidRequest",
            Self::InternalError => "InternalError",
        }
    }

    /// The HTTP status the frontend should answer with for this code.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NoSuchBucket
            | Self::NoSuchKey
            | Self::NoSuchUpload
            | Self::NoSuchBucketPolicy
            | Self::BucketTaggingNotFound
            | Self::ObjectLockConfigurationNotFound
            | Self::NoSuchObjectLockConfiguration => 404,
            Self::BucketAlreadyExists | Self::BucketNotEmpty => 409,
            Self::InvalidRange => 416,
            Self::QuotaExceeded => 403,
            Self::InternalError => 500,
            _ => 400,
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error value: a code plus a human-readable message.
///
/// # Examples
///
/// ```
/// use fsgate_s3_model::error::{S3Error, S3ErrorCode};
///
/// let err = S3Error::with_message(S3ErrorCode::NoSuchKey, "no such key: photos/a.jpg");
/// assert_eq!(err.code(), S3ErrorCode::NoSuchKey);
/// assert_eq!(err.code().http_status(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct S3Error {
    code: S3ErrorCode,
    message: String,
}

impl S3Error {
    /// Create an error with an explicit message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The error code.
    #[must_use]
    pub fn code(&self) -> S3ErrorCode {
        self.code
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
