//! Integration tests for the fsgate POSIX backend.
//!
//! Every test builds a fresh backend over a temporary filesystem root and
//! drives it through the [`Backend`] trait, the same surface the request
//! frontend consumes. The sidecar metadata store keeps the suite
//! independent of the host filesystem's xattr support.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use fsgate_posix::{Backend, Posix, PosixOpts, SidecarStore};
use fsgate_s3_model::input::{CreateBucketInput, GetObjectInput, PutObjectInput};
use fsgate_s3_model::output::{GetObjectOutput, PutObjectOutput};
use fsgate_s3_model::types::{Account, Acl};
use fsgate_s3_model::StreamingBlob;

/// A fresh backend bound to a temporary root. The root must outlive the
/// backend, so both are returned together.
pub fn test_backend() -> (TempDir, Posix) {
    let root = tempfile::tempdir().expect("create temp root");
    let meta = Arc::new(SidecarStore::new(root.path()));
    let backend = Posix::new(root.path(), meta, PosixOpts::default()).expect("bind backend");
    (root, backend)
}

/// The account all tests act as.
#[must_use]
pub fn admin_account() -> Account {
    Account {
        access: "admin".to_owned(),
        ..Account::default()
    }
}

/// Create a bucket owned by [`admin_account`].
pub async fn create_bucket(fs: &Posix, bucket: &str) {
    let acl = Acl {
        owner: admin_account().access,
        grantees: Vec::new(),
    };
    fs.create_bucket(
        &admin_account(),
        CreateBucketInput {
            bucket: bucket.to_owned(),
            acl: serde_json::to_vec(&acl).expect("serialize acl"),
            object_lock_enabled_for_bucket: false,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("failed to create bucket {bucket}: {e}"));
}

/// Store an object with a buffered body.
pub async fn put(fs: &Posix, bucket: &str, key: &str, body: impl Into<Bytes>) -> PutObjectOutput {
    let body = body.into();
    fs.put_object(
        &admin_account(),
        PutObjectInput {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            content_length: body.len() as i64,
            body: StreamingBlob::from(body),
            ..PutObjectInput::default()
        },
    )
    .await
    .unwrap_or_else(|e| panic!("failed to put {bucket}/{key}: {e}"))
}

/// Fetch an object's full body and metadata.
pub async fn get(fs: &Posix, bucket: &str, key: &str) -> (Vec<u8>, GetObjectOutput) {
    let mut body = Cursor::new(Vec::new());
    let output = fs
        .get_object(
            GetObjectInput {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                range: None,
            },
            &mut body,
        )
        .await
        .unwrap_or_else(|e| panic!("failed to get {bucket}/{key}: {e}"));
    (body.into_inner(), output)
}

mod test_attrs;
mod test_bucket;
mod test_list;
mod test_lock;
mod test_object;
