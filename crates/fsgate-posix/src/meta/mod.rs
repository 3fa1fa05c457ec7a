//! Per-path metadata storage.
//!
//! Buckets and objects carry named byte-string attributes (etags, ACLs,
//! tagging, lock state). [`MetadataStore`] is the capability set the
//! backend is polymorphic over; [`XattrStore`] keeps attributes as
//! filesystem extended attributes on the path itself, [`SidecarStore`]
//! keeps them as files in a parallel tree for filesystems without xattr
//! support.
//!
//! `object = ""` addresses attributes attached to the bucket itself.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod sidecar;
mod xattr;

pub use sidecar::SidecarStore;
pub use xattr::XattrStore;

/// Errors from the metadata store.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// The attribute does not exist on the path.
    #[error("no such metadata key")]
    NoSuchKey,

    /// The path itself does not exist.
    #[error("path not found")]
    NotFound,

    /// Any other filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MetaError {
    /// Classify a raw io error: missing path becomes [`MetaError::NotFound`].
    pub(crate) fn from_io(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }
}

/// Capability set for attribute storage bound to `(bucket, object)` paths.
///
/// Implementations are synchronous: attribute payloads are small and the
/// calls sit on the same filesystem the data path uses.
pub trait MetadataStore: Send + Sync {
    /// Store (create or replace) one attribute.
    fn store(&self, bucket: &str, object: &str, key: &str, value: &[u8]) -> Result<(), MetaError>;

    /// Retrieve one attribute. [`MetaError::NoSuchKey`] when the path
    /// exists but carries no such attribute.
    fn retrieve(&self, bucket: &str, object: &str, key: &str) -> Result<Vec<u8>, MetaError>;

    /// List the attribute names present on the path.
    fn list(&self, bucket: &str, object: &str) -> Result<Vec<String>, MetaError>;

    /// Delete one attribute. [`MetaError::NoSuchKey`] when absent.
    fn delete(&self, bucket: &str, object: &str, key: &str) -> Result<(), MetaError>;

    /// Delete every attribute on the path. Missing paths are a no-op.
    fn delete_all(&self, bucket: &str, object: &str) -> Result<(), MetaError>;
}

/// Which metadata store variant to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaVariant {
    /// Extended attributes on the paths themselves (default).
    #[default]
    Xattr,
    /// Sidecar files in a parallel tree.
    Sidecar,
}

/// Open the selected metadata store for a root directory.
///
/// The xattr variant self-tests the root and fails here when the
/// filesystem does not support user extended attributes.
///
/// # Errors
///
/// Returns [`MetaError`] when the root is unusable for the variant.
pub fn open_store(
    root: impl Into<PathBuf>,
    variant: MetaVariant,
) -> Result<Arc<dyn MetadataStore>, MetaError> {
    let root = root.into();
    match variant {
        MetaVariant::Xattr => Ok(Arc::new(XattrStore::new(root)?)),
        MetaVariant::Sidecar => Ok(Arc::new(SidecarStore::new(root))),
    }
}

/// Join `root/bucket/object`, tolerating an empty object path.
pub(crate) fn node_path(root: &Path, bucket: &str, object: &str) -> PathBuf {
    let mut path = root.join(bucket);
    for comp in object.split('/').filter(|c| !c.is_empty()) {
        path.push(comp);
    }
    path
}
