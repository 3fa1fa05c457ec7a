//! Path and name mapping between the S3 namespace and the filesystem.
//!
//! Buckets are directories directly under the root; object keys split on
//! `/` into path components below the bucket. Multipart uploads stage
//! under a per-key container named by the SHA-256 of the key, giving a
//! flat layout and O(1) lookup for arbitrary keys.

use std::io;
use std::path::{Path, PathBuf};

use digest::Digest;
use sha2::Sha256;

use crate::error::BackendError;

/// Internal state directory inside every bucket, hidden from listings.
pub const META_TMP_DIR: &str = ".sgwtmp";

/// Multipart staging area inside the internal state directory.
pub const META_TMP_MULTIPART_DIR: &str = ".sgwtmp/multipart";

/// Validate a bucket name as a safe top-level directory name.
///
/// # Errors
///
/// Returns [`BackendError::InvalidBucketName`] for empty names, path
/// separators, or dot components.
pub fn validate_bucket_name(bucket: &str) -> Result<(), BackendError> {
    if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains('/') {
        return Err(BackendError::InvalidBucketName {
            name: bucket.to_owned(),
        });
    }
    Ok(())
}

/// Map an object key to its path below the bucket directory.
///
/// Keys split on `/`; empty components collapse (so a directory-object
/// key's trailing `/` is tolerated). Absolute keys and `.`/`..` components
/// are rejected so no key can resolve outside the bucket.
///
/// # Errors
///
/// Returns [`BackendError::InvalidRequest`] for empty, absolute, or
/// traversing keys.
pub fn object_path(bucket_dir: &Path, key: &str) -> Result<PathBuf, BackendError> {
    if key.is_empty() || key.starts_with('/') {
        return Err(BackendError::InvalidRequest {
            message: format!("invalid object key: {key:?}"),
        });
    }

    let mut path = bucket_dir.to_path_buf();
    for comp in key.split('/').filter(|c| !c.is_empty()) {
        if comp == "." || comp == ".." {
            return Err(BackendError::InvalidRequest {
                message: format!("object key escapes bucket: {key:?}"),
            });
        }
        path.push(comp);
    }
    Ok(path)
}

/// The multipart container name for a key: hex SHA-256 of the key bytes.
#[must_use]
pub fn multipart_container(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// The parent of a key within the bucket namespace, if any.
///
/// `a/b/c` → `a/b`; `a` → `None`. Trailing slashes are ignored.
#[must_use]
pub fn key_parent(key: &str) -> Option<&str> {
    let key = key.trim_end_matches('/');
    key.rfind('/').map(|idx| &key[..idx])
}

/// Create `dir` and any missing ancestors, chowning every directory this
/// call creates when `chown` carries ids.
///
/// Existing directories are left untouched. A non-directory in the way
/// surfaces as the io error from `mkdir`.
pub fn mkdir_all(dir: &Path, chown: Option<(u32, u32)>) -> io::Result<()> {
    // Find the deepest existing ancestor, then create downward from it.
    let mut missing = Vec::new();
    let mut current = dir;
    loop {
        if current.as_os_str().is_empty() || current.exists() {
            break;
        }
        missing.push(current.to_path_buf());
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    for created in missing.iter().rev() {
        match std::fs::create_dir(created) {
            Ok(()) => {
                if let Some((uid, gid)) = chown {
                    std::os::unix::fs::chown(created, Some(uid), Some(gid))?;
                }
            }
            // A concurrent writer may have created it first.
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && created.is_dir() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
