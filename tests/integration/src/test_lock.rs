//! Object-lock state machine tests.

#[cfg(test)]
mod tests {
    use fsgate_posix::{Backend, BackendError, Posix};
    use fsgate_s3_model::input::CreateBucketInput;
    use fsgate_s3_model::types::{BucketLockConfig, ObjectLockRetention};

    use crate::{admin_account, create_bucket, put, test_backend};

    /// Create a bucket with object lock enabled from creation.
    async fn create_locked_bucket(fs: &Posix, bucket: &str) {
        fs.create_bucket(
            &admin_account(),
            CreateBucketInput {
                bucket: bucket.to_owned(),
                acl: b"{\"owner\":\"admin\",\"grantees\":[]}".to_vec(),
                object_lock_enabled_for_bucket: true,
            },
        )
        .await
        .expect("create locked bucket");
    }

    #[tokio::test]
    async fn test_should_store_default_lock_config_at_creation() {
        let (_root, fs) = test_backend();
        create_locked_bucket(&fs, "locked").await;

        let blob = fs
            .get_object_lock_configuration("locked")
            .await
            .expect("lock config");
        let config: BucketLockConfig = serde_json::from_slice(&blob).expect("parse config");
        assert!(config.enabled);
        assert!(config.created_at.is_some());
    }

    #[tokio::test]
    async fn test_should_reject_lock_config_on_plain_bucket() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "plain").await;

        let err = fs
            .put_object_lock_configuration("plain", b"{\"enabled\":true}")
            .await
            .expect_err("lock not enabled at creation");
        assert!(matches!(err, BackendError::ObjectLockConfigurationNotAllowed));

        let err = fs
            .get_object_lock_configuration("plain")
            .await
            .expect_err("no lock config");
        assert!(matches!(err, BackendError::ObjectLockConfigurationNotFound));
    }

    #[tokio::test]
    async fn test_should_round_trip_legal_hold() {
        let (_root, fs) = test_backend();
        create_locked_bucket(&fs, "locked").await;
        put(&fs, "locked", "k", "data").await;

        fs.put_object_legal_hold("locked", "k", true)
            .await
            .expect("set hold");
        assert!(fs.get_object_legal_hold("locked", "k").await.expect("get hold"));

        fs.put_object_legal_hold("locked", "k", false)
            .await
            .expect("release hold");
        assert!(!fs.get_object_legal_hold("locked", "k").await.expect("get hold"));
    }

    #[tokio::test]
    async fn test_should_round_trip_retention() {
        let (_root, fs) = test_backend();
        create_locked_bucket(&fs, "locked").await;
        put(&fs, "locked", "k", "data").await;

        let retention = ObjectLockRetention {
            mode: "GOVERNANCE".to_owned(),
            retain_until_date: Some(chrono_now_plus_day()),
        };
        let blob = serde_json::to_vec(&retention).expect("serialize retention");

        fs.put_object_retention("locked", "k", &blob)
            .await
            .expect("set retention");

        let stored = fs
            .get_object_retention("locked", "k")
            .await
            .expect("get retention");
        let parsed: ObjectLockRetention = serde_json::from_slice(&stored).expect("parse");
        assert_eq!(parsed.mode, "GOVERNANCE");
    }

    #[tokio::test]
    async fn test_should_require_enabled_lock_for_object_state() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "plain").await;
        put(&fs, "plain", "k", "data").await;

        let err = fs
            .put_object_legal_hold("plain", "k", true)
            .await
            .expect_err("lock disabled");
        assert!(matches!(
            err,
            BackendError::InvalidBucketObjectLockConfiguration
        ));

        let err = fs
            .put_object_retention("plain", "k", b"{\"mode\":\"GOVERNANCE\"}")
            .await
            .expect_err("lock disabled");
        assert!(matches!(
            err,
            BackendError::InvalidBucketObjectLockConfiguration
        ));
    }

    #[tokio::test]
    async fn test_should_report_missing_object_for_lock_writes() {
        let (_root, fs) = test_backend();
        create_locked_bucket(&fs, "locked").await;

        let err = fs
            .put_object_legal_hold("locked", "ghost", true)
            .await
            .expect_err("missing key");
        assert!(matches!(err, BackendError::NoSuchKey { .. }));

        let err = fs
            .get_object_retention("locked", "ghost")
            .await
            .expect_err("missing key");
        assert!(matches!(err, BackendError::NoSuchKey { .. }));
    }

    #[tokio::test]
    async fn test_should_report_absent_lock_state_on_object() {
        let (_root, fs) = test_backend();
        create_locked_bucket(&fs, "locked").await;
        put(&fs, "locked", "k", "data").await;

        let err = fs
            .get_object_legal_hold("locked", "k")
            .await
            .expect_err("no hold set");
        assert!(matches!(err, BackendError::NoSuchObjectLockConfiguration));

        let err = fs
            .get_object_retention("locked", "k")
            .await
            .expect_err("no retention set");
        assert!(matches!(err, BackendError::NoSuchObjectLockConfiguration));
    }

    fn chrono_now_plus_day() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now() + chrono::Duration::days(1)
    }
}
