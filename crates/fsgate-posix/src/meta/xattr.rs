//! Extended-attribute metadata store.

use std::io;
use std::path::PathBuf;

use super::{node_path, MetaError, MetadataStore};

/// Namespace prefix for user extended attributes.
const XATTR_PREFIX: &str = "user.";

/// Attribute written and removed by the startup self-test.
const PROBE_ATTR: &str = "user.fsgate-probe";

/// Metadata store backed by filesystem extended attributes.
///
/// Every logical key maps to `user.<key>` on the path. Construction probes
/// the root so an unsupported filesystem fails at startup rather than on
/// the first request.
#[derive(Debug)]
pub struct XattrStore {
    root: PathBuf,
}

impl XattrStore {
    /// Open the store, self-testing xattr support on `root`.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::Io`] when the probe attribute cannot be
    /// written, read back, or removed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MetaError> {
        let root = root.into();
        Self::probe(&root)?;
        Ok(Self { root })
    }

    /// Write, read back, and remove a probe attribute.
    fn probe(root: &std::path::Path) -> Result<(), MetaError> {
        xattr::set(root, PROBE_ATTR, b"1").map_err(MetaError::from_io)?;
        let got = xattr::get(root, PROBE_ATTR).map_err(MetaError::from_io)?;
        xattr::remove(root, PROBE_ATTR).map_err(MetaError::from_io)?;
        if got.as_deref() != Some(b"1".as_slice()) {
            return Err(MetaError::Io(io::Error::other(
                "xattr probe read back mismatched data",
            )));
        }
        Ok(())
    }

    fn attr_name(key: &str) -> String {
        format!("{XATTR_PREFIX}{key}")
    }
}

impl MetadataStore for XattrStore {
    fn store(&self, bucket: &str, object: &str, key: &str, value: &[u8]) -> Result<(), MetaError> {
        let path = node_path(&self.root, bucket, object);
        xattr::set(&path, Self::attr_name(key), value).map_err(MetaError::from_io)
    }

    fn retrieve(&self, bucket: &str, object: &str, key: &str) -> Result<Vec<u8>, MetaError> {
        let path = node_path(&self.root, bucket, object);
        match xattr::get(&path, Self::attr_name(key)) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(MetaError::NoSuchKey),
            Err(err) => Err(MetaError::from_io(err)),
        }
    }

    fn list(&self, bucket: &str, object: &str) -> Result<Vec<String>, MetaError> {
        let path = node_path(&self.root, bucket, object);
        let names = xattr::list(&path).map_err(MetaError::from_io)?;
        Ok(names
            .filter_map(|name| {
                name.to_str()
                    .and_then(|n| n.strip_prefix(XATTR_PREFIX))
                    .map(str::to_owned)
            })
            .collect())
    }

    fn delete(&self, bucket: &str, object: &str, key: &str) -> Result<(), MetaError> {
        let path = node_path(&self.root, bucket, object);
        match xattr::remove(&path, Self::attr_name(key)) {
            Ok(()) => Ok(()),
            // ENODATA: the attribute was not present.
            Err(err) if err.raw_os_error() == Some(libc::ENODATA) => Err(MetaError::NoSuchKey),
            Err(err) => Err(MetaError::from_io(err)),
        }
    }

    fn delete_all(&self, bucket: &str, object: &str) -> Result<(), MetaError> {
        // Attributes die with the path; only a still-existing path needs
        // explicit clearing.
        let names = match self.list(bucket, object) {
            Ok(names) => names,
            Err(MetaError::NotFound) => return Ok(()),
            Err(err) => return Err(err),
        };
        for name in names {
            match self.delete(bucket, object, &name) {
                Ok(()) | Err(MetaError::NoSuchKey) | Err(MetaError::NotFound) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
