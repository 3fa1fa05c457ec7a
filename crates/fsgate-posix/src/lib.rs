//! POSIX filesystem storage backend for the fsgate S3 gateway.
//!
//! One backend instance is bound to one filesystem root. Directories
//! directly under the root are buckets; files (and marked directories)
//! below a bucket are objects, with keys split on `/`. Object and bucket
//! metadata (etags, ACLs, tagging, policies, lock state) is attached to
//! paths through a pluggable [`meta::MetadataStore`] — extended attributes
//! by default, a sidecar tree where the filesystem lacks them.
//!
//! Correctness guarantees carried by this crate:
//!
//! - Object publication is atomic: bodies are staged in a hidden temp
//!   directory and enter the namespace through a single rename
//!   ([`tmpfile`]), so readers observe either the complete object or none.
//! - Listings reproduce S3 prefix/delimiter/marker paging over a sorted
//!   filesystem walk ([`walker`]), never exposing internal state
//!   directories.
//! - Multipart uploads are staged under a content-addressed container and
//!   validated in full before the namespace is touched.
//!
//! The frontend consumes the backend through the object-safe
//! [`backend::Backend`] trait.

pub mod backend;
pub mod checksums;
pub mod error;
pub mod fsutil;
pub mod meta;
pub mod posix;
pub mod scoutfs;
pub mod tmpfile;
pub mod walker;

pub use backend::Backend;
pub use error::{BackendError, BackendResult};
pub use meta::{MetadataStore, SidecarStore, XattrStore};
pub use posix::{Posix, PosixOpts};
pub use scoutfs::ScoutFs;
