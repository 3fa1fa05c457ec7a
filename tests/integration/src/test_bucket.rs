//! Bucket lifecycle integration tests.

#[cfg(test)]
mod tests {
    use fsgate_posix::{Backend, BackendError};
    use fsgate_s3_model::input::{DeleteBucketInput, HeadBucketInput};

    use crate::{admin_account, create_bucket, put, test_backend};

    #[tokio::test]
    async fn test_should_run_bucket_lifecycle() {
        let (_root, fs) = test_backend();

        create_bucket(&fs, "b").await;
        fs.head_bucket(HeadBucketInput {
            bucket: "b".to_owned(),
        })
        .await
        .expect("head after create");

        fs.delete_bucket(DeleteBucketInput {
            bucket: "b".to_owned(),
        })
        .await
        .expect("delete empty bucket");

        let err = fs
            .head_bucket(HeadBucketInput {
                bucket: "b".to_owned(),
            })
            .await
            .expect_err("head after delete");
        assert!(matches!(err, BackendError::NoSuchBucket { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_bucket() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "taken").await;

        let err = fs
            .create_bucket(
                &admin_account(),
                fsgate_s3_model::input::CreateBucketInput {
                    bucket: "taken".to_owned(),
                    ..Default::default()
                },
            )
            .await
            .expect_err("duplicate create");
        assert!(matches!(err, BackendError::BucketAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_delete_of_non_empty_bucket() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "full").await;
        put(&fs, "full", "obj", "data").await;

        let err = fs
            .delete_bucket(DeleteBucketInput {
                bucket: "full".to_owned(),
            })
            .await
            .expect_err("delete non-empty");
        assert!(matches!(err, BackendError::BucketNotEmpty { .. }));
    }

    #[tokio::test]
    async fn test_should_delete_bucket_with_leftover_state_dir() {
        let (root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        // Simulate leftover staging state as the sole child.
        std::fs::create_dir_all(root.path().join("b/.sgwtmp/multipart")).expect("mkdir state");

        fs.delete_bucket(DeleteBucketInput {
            bucket: "b".to_owned(),
        })
        .await
        .expect("delete bucket with internal state only");
    }

    #[tokio::test]
    async fn test_should_filter_buckets_by_owner() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "mine").await;

        let listed = fs.list_buckets("admin", false).await.expect("list");
        assert_eq!(listed.buckets.len(), 1);
        assert_eq!(listed.buckets[0].name, "mine");

        let other = fs.list_buckets("somebody-else", false).await.expect("list");
        assert!(other.buckets.is_empty());

        let admin_view = fs.list_buckets("somebody-else", true).await.expect("list");
        assert_eq!(admin_view.buckets.len(), 1);
    }

    #[tokio::test]
    async fn test_should_sort_buckets_by_name() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "zeta").await;
        create_bucket(&fs, "alpha").await;
        create_bucket(&fs, "mid").await;

        let listed = fs.list_buckets("admin", true).await.expect("list");
        let names: Vec<&str> = listed.buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_should_delegate_through_scoutfs_variant() {
        use fsgate_posix::{PosixOpts, ScoutFs, SidecarStore};
        use std::sync::Arc;

        let root = tempfile::tempdir().expect("temp root");
        let meta = Arc::new(SidecarStore::new(root.path()));
        let fs = ScoutFs::new(root.path(), meta, PosixOpts::default()).expect("bind scoutfs");
        assert_eq!(fs.name(), "ScoutFS Gateway");

        fs.create_bucket(
            &admin_account(),
            fsgate_s3_model::input::CreateBucketInput {
                bucket: "b".to_owned(),
                ..Default::default()
            },
        )
        .await
        .expect("create via scoutfs");

        fs.head_bucket(HeadBucketInput {
            bucket: "b".to_owned(),
        })
        .await
        .expect("head via scoutfs");
    }

    #[tokio::test]
    async fn test_should_change_bucket_owner() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        fs.change_bucket_owner("b", "new-owner")
            .await
            .expect("change owner");

        let buckets = fs.list_buckets_and_owners().await.expect("list owners");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].name, "b");
        assert_eq!(buckets[0].owner, "new-owner");
    }
}
