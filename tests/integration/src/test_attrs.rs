//! Bucket/object tagging, policy, and ACL round-trip tests.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use fsgate_posix::{Backend, BackendError};

    use crate::{create_bucket, put, test_backend};

    fn sample_tags() -> HashMap<String, String> {
        let mut tags = HashMap::new();
        tags.insert("env".to_owned(), "prod".to_owned());
        tags.insert("team".to_owned(), "storage".to_owned());
        tags
    }

    #[tokio::test]
    async fn test_should_round_trip_bucket_tagging() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let tags = sample_tags();
        fs.put_bucket_tagging("b", Some(tags.clone()))
            .await
            .expect("put tags");

        let stored = fs.get_bucket_tagging("b").await.expect("get tags");
        assert_eq!(stored, tags);
    }

    #[tokio::test]
    async fn test_should_clear_bucket_tagging_idempotently() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        fs.put_bucket_tagging("b", Some(sample_tags()))
            .await
            .expect("put tags");

        fs.put_bucket_tagging("b", None).await.expect("clear tags");
        // Clearing again is a no-op, not an error.
        fs.put_bucket_tagging("b", None).await.expect("clear again");

        let err = fs.get_bucket_tagging("b").await.expect_err("no tag set");
        assert!(matches!(err, BackendError::TaggingNotFound));
    }

    #[tokio::test]
    async fn test_should_round_trip_object_tagging() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "k", "data").await;

        let tags = sample_tags();
        fs.put_object_tagging("b", "k", Some(tags.clone()))
            .await
            .expect("put tags");

        let stored = fs.get_object_tagging("b", "k").await.expect("get tags");
        assert_eq!(stored, tags);

        fs.delete_object_tagging("b", "k").await.expect("delete tags");
        let err = fs.get_object_tagging("b", "k").await.expect_err("cleared");
        assert!(matches!(err, BackendError::TaggingNotFound));
    }

    #[tokio::test]
    async fn test_should_reject_tagging_of_missing_object() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let err = fs
            .put_object_tagging("b", "ghost", Some(sample_tags()))
            .await
            .expect_err("missing object");
        assert!(matches!(err, BackendError::NoSuchKey { .. }));

        let err = fs
            .get_object_tagging("b", "ghost")
            .await
            .expect_err("missing object");
        assert!(matches!(err, BackendError::NoSuchKey { .. }));
    }

    #[tokio::test]
    async fn test_should_round_trip_bucket_policy() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let policy = br#"{"Version":"2012-10-17","Statement":[]}"#;
        fs.put_bucket_policy("b", Some(policy)).await.expect("put policy");

        let stored = fs.get_bucket_policy("b").await.expect("get policy");
        assert_eq!(stored, policy);
    }

    #[tokio::test]
    async fn test_should_report_missing_bucket_policy() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let err = fs.get_bucket_policy("b").await.expect_err("no policy");
        assert!(matches!(err, BackendError::NoSuchBucketPolicy { .. }));
    }

    #[tokio::test]
    async fn test_should_clear_bucket_policy() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        fs.put_bucket_policy("b", Some(b"{}")).await.expect("put policy");
        fs.delete_bucket_policy("b").await.expect("delete policy");

        let err = fs.get_bucket_policy("b").await.expect_err("cleared");
        assert!(matches!(err, BackendError::NoSuchBucketPolicy { .. }));

        // Clearing an already-absent policy is a no-op.
        fs.delete_bucket_policy("b").await.expect("delete again");
    }

    #[tokio::test]
    async fn test_should_round_trip_bucket_acl() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let acl = br#"{"owner":"other","grantees":[]}"#;
        fs.put_bucket_acl("b", acl).await.expect("put acl");

        let stored = fs.get_bucket_acl("b").await.expect("get acl");
        assert_eq!(stored, acl);
    }

    #[tokio::test]
    async fn test_should_fail_attr_ops_on_missing_bucket() {
        let (_root, fs) = test_backend();

        assert!(matches!(
            fs.get_bucket_tagging("ghost").await,
            Err(BackendError::NoSuchBucket { .. })
        ));
        assert!(matches!(
            fs.get_bucket_policy("ghost").await,
            Err(BackendError::NoSuchBucket { .. })
        ));
        assert!(matches!(
            fs.put_bucket_acl("ghost", b"{}").await,
            Err(BackendError::NoSuchBucket { .. })
        ));
    }
}
