//! Sidecar-file metadata store.

use std::io;
use std::path::{Path, PathBuf};

use super::{MetaError, MetadataStore};

/// Root-level directory holding the parallel metadata tree.
pub(crate) const SIDECAR_DIR: &str = ".sgwmeta";

/// Leaf directory holding one node's attribute files.
const ATTRS_DIR: &str = ".attrs";

/// Metadata store keeping attributes as files in a parallel tree, for
/// filesystems without extended-attribute support.
///
/// The attribute `k` of object `a/b` in bucket `B` lives at
/// `<root>/.sgwmeta/B/a/b/.attrs/k`; bucket-level attributes live at
/// `<root>/.sgwmeta/B/.attrs/<k>`. The tree is parallel to the data tree,
/// so object listings inside buckets never see it; root-level bucket
/// enumeration skips dot-prefixed names.
#[derive(Debug)]
pub struct SidecarStore {
    root: PathBuf,
}

impl SidecarStore {
    /// Open the store. The sidecar tree is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `.attrs` directory for a `(bucket, object)` node.
    fn attrs_dir(&self, bucket: &str, object: &str) -> PathBuf {
        let mut path = self.root.join(SIDECAR_DIR);
        path.push(bucket);
        for comp in object.split('/').filter(|c| !c.is_empty()) {
            path.push(comp);
        }
        path.push(ATTRS_DIR);
        path
    }

    /// The data path the attributes describe; writes require it to exist so
    /// sidecar semantics match xattr semantics.
    fn data_path(&self, bucket: &str, object: &str) -> PathBuf {
        super::node_path(&self.root, bucket, object)
    }
}

impl MetadataStore for SidecarStore {
    fn store(&self, bucket: &str, object: &str, key: &str, value: &[u8]) -> Result<(), MetaError> {
        if !self.data_path(bucket, object).exists() {
            return Err(MetaError::NotFound);
        }
        let dir = self.attrs_dir(bucket, object);
        std::fs::create_dir_all(&dir).map_err(MetaError::from_io)?;
        std::fs::write(dir.join(key), value).map_err(MetaError::from_io)
    }

    fn retrieve(&self, bucket: &str, object: &str, key: &str) -> Result<Vec<u8>, MetaError> {
        if !self.data_path(bucket, object).exists() {
            return Err(MetaError::NotFound);
        }
        match std::fs::read(self.attrs_dir(bucket, object).join(key)) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(MetaError::NoSuchKey),
            Err(err) => Err(MetaError::Io(err)),
        }
    }

    fn list(&self, bucket: &str, object: &str) -> Result<Vec<String>, MetaError> {
        let dir = self.attrs_dir(bucket, object);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(MetaError::Io(err)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(MetaError::Io)?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    fn delete(&self, bucket: &str, object: &str, key: &str) -> Result<(), MetaError> {
        if !self.data_path(bucket, object).exists() {
            return Err(MetaError::NotFound);
        }
        match std::fs::remove_file(self.attrs_dir(bucket, object).join(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(MetaError::NoSuchKey),
            Err(err) => Err(MetaError::Io(err)),
        }
    }

    fn delete_all(&self, bucket: &str, object: &str) -> Result<(), MetaError> {
        // Remove this node's sidecar subtree, then prune empty parents up
        // to the sidecar root so deleted object trees leave nothing behind.
        let mut node = self.attrs_dir(bucket, object);
        node.pop();
        match std::fs::remove_dir_all(&node) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(MetaError::Io(err)),
        }
        let stop = self.root.join(SIDECAR_DIR);
        prune_empty_parents(&node, &stop);
        Ok(())
    }
}

/// Remove empty ancestor directories of `node`, stopping at `stop`.
fn prune_empty_parents(node: &Path, stop: &Path) {
    let mut current = node.parent();
    while let Some(dir) = current {
        if dir == stop || std::fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}
