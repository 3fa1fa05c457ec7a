//! Staged object writes.
//!
//! Bodies never touch their final name while incomplete: they stream into
//! a named temp file inside the bucket's internal state directory, get
//! fsynced, and enter the namespace through a single atomic rename. On
//! every non-published path the temp file is unlinked, so a crash or error
//! leaves either the complete object or nothing (invariant: readers never
//! observe partial data under the final name).
//!
//! The staged file is chowned to the requesting account before any data is
//! written and its size is preallocated up front, so disk quota charges the
//! account and quota exhaustion surfaces before streaming starts.

use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use tempfile::TempPath;
use tokio::fs::File;
use tracing::debug;

use crate::error::{classify_write, is_quota, BackendError};

/// A temp file staged for atomic publication.
///
/// Dropping a `StagedFile` without calling [`StagedFile::publish`] removes
/// the temp file.
#[derive(Debug)]
pub struct StagedFile {
    file: File,
    path: TempPath,
}

impl StagedFile {
    /// Create a staged file in `tmp_dir` (created if missing), owned by
    /// `owner` when given, preallocated to `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::QuotaExceeded`] when the preallocation hits
    /// the account's disk quota; other failures wrap as internal errors.
    pub fn create(
        tmp_dir: &Path,
        size: i64,
        owner: Option<(u32, u32)>,
    ) -> Result<Self, BackendError> {
        std::fs::create_dir_all(tmp_dir)
            .map_err(|e| classify_write(e, "create staging directory"))?;

        let tmp = tempfile::Builder::new()
            .prefix(".stage-")
            .tempfile_in(tmp_dir)
            .map_err(|e| classify_write(e, "create staged file"))?;

        if let Some((uid, gid)) = owner {
            std::os::unix::fs::chown(tmp.path(), Some(uid), Some(gid))
                .map_err(|e| classify_write(e, "chown staged file"))?;
        }

        if size > 0 {
            preallocate(tmp.as_file(), size)?;
        }

        let (file, path) = tmp.into_parts();
        Ok(Self {
            file: File::from_std(file),
            path,
        })
    }

    /// The staged file, for streaming body data into it.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Make the staged data durable and give it its final name.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::ExistingObjectIsDirectory`] when a directory
    /// occupies the target name; the temp file is removed on every error.
    pub async fn publish(self, target: &Path) -> Result<(), BackendError> {
        self.file
            .sync_all()
            .await
            .map_err(|e| classify_write(e, "sync staged file"))?;
        drop(self.file);

        match self.path.persist(target) {
            Ok(()) => Ok(()),
            Err(err) => {
                // `err.path` still owns the temp file and unlinks it on drop.
                debug!(target = %target.display(), error = %err.error, "staged publish failed");
                let errno = err.error.raw_os_error();
                if errno == Some(libc::EISDIR) || errno == Some(libc::ENOTEMPTY) {
                    Err(BackendError::ExistingObjectIsDirectory)
                } else {
                    Err(classify_write(err.error, "publish staged file"))
                }
            }
        }
    }
}

/// Reserve `size` bytes for the file, charging quota now rather than
/// mid-stream. Filesystems without preallocation support are tolerated.
fn preallocate(file: &std::fs::File, size: i64) -> Result<(), BackendError> {
    // posix_fallocate returns the errno instead of setting it.
    let rc = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, size) };
    match rc {
        0 => Ok(()),
        libc::EDQUOT | libc::ENOSPC => Err(BackendError::QuotaExceeded),
        libc::EOPNOTSUPP | libc::EINVAL => Ok(()),
        errno => {
            let err = io::Error::from_raw_os_error(errno);
            if is_quota(&err) {
                Err(BackendError::QuotaExceeded)
            } else {
                Err(classify_write(err, "preallocate staged file"))
            }
        }
    }
}
