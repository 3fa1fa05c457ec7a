//! Object round-trip, range, copy, and delete integration tests.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use fsgate_posix::{Backend, BackendError};
    use fsgate_s3_model::input::{
        CopyObjectInput, DeleteObjectInput, DeleteObjectsInput, GetObjectAttributesInput,
        GetObjectInput, HeadObjectInput, ListObjectsV2Input, PutObjectInput,
    };
    use fsgate_s3_model::types::ObjectIdentifier;
    use fsgate_s3_model::StreamingBlob;

    use crate::{admin_account, create_bucket, get, put, test_backend};

    async fn get_range(
        fs: &fsgate_posix::Posix,
        bucket: &str,
        key: &str,
        range: &str,
    ) -> Result<Vec<u8>, BackendError> {
        let mut body = Cursor::new(Vec::new());
        fs.get_object(
            GetObjectInput {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                range: Some(range.to_owned()),
            },
            &mut body,
        )
        .await?;
        Ok(body.into_inner())
    }

    #[tokio::test]
    async fn test_should_round_trip_object() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let putout = put(&fs, "b", "k", "hello").await;
        assert_eq!(putout.etag, "5d41402abc4b2a76b9719d911017c592");

        let (body, out) = get(&fs, "b", "k").await;
        assert_eq!(body, b"hello");
        assert_eq!(out.etag, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(out.content_length, 5);
    }

    #[tokio::test]
    async fn test_should_store_directory_object() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let putout = put(&fs, "b", "d/", "").await;
        assert_eq!(putout.etag, "d41d8cd98f00b204e9800998ecf8427e");

        let (body, out) = get(&fs, "b", "d/").await;
        assert!(body.is_empty());
        assert_eq!(out.content_length, 0);
        assert_eq!(out.etag, "d41d8cd98f00b204e9800998ecf8427e");

        // The directory-object appears in listings with its trailing slash.
        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                ..Default::default()
            })
            .await
            .expect("list");
        let keys: Vec<&str> = listed.contents.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["d/"]);
    }

    #[tokio::test]
    async fn test_should_reject_directory_object_with_body() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let err = fs
            .put_object(
                &admin_account(),
                PutObjectInput {
                    bucket: "b".to_owned(),
                    key: "d/".to_owned(),
                    content_length: 4,
                    body: StreamingBlob::from("data"),
                    ..PutObjectInput::default()
                },
            )
            .await
            .expect_err("directory object with payload");
        assert!(matches!(err, BackendError::DirectoryObjectContainsData));
    }

    #[tokio::test]
    async fn test_should_reject_put_onto_directory() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "a/b", "nested").await;

        // "a" exists as a parent directory now.
        let err = fs
            .put_object(
                &admin_account(),
                PutObjectInput {
                    bucket: "b".to_owned(),
                    key: "a".to_owned(),
                    content_length: 1,
                    body: StreamingBlob::from("x"),
                    ..PutObjectInput::default()
                },
            )
            .await
            .expect_err("put onto directory");
        assert!(matches!(err, BackendError::ExistingObjectIsDirectory));
    }

    #[tokio::test]
    async fn test_should_prune_incidental_parents_on_delete() {
        let (root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "a/b/c/k", "payload").await;

        assert!(root.path().join("b/a/b/c").is_dir());

        fs.delete_object(DeleteObjectInput {
            bucket: "b".to_owned(),
            key: "a/b/c/k".to_owned(),
        })
        .await
        .expect("delete object");

        // Every auto-created ancestor is gone.
        assert!(!root.path().join("b/a").exists());
        assert!(root.path().join("b").is_dir());
    }

    #[tokio::test]
    async fn test_should_keep_directory_object_parents_on_delete() {
        let (root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        // "a/" is an intentional directory-object; "a/b" is incidental.
        put(&fs, "b", "a/", "").await;
        put(&fs, "b", "a/b/k", "payload").await;

        fs.delete_object(DeleteObjectInput {
            bucket: "b".to_owned(),
            key: "a/b/k".to_owned(),
        })
        .await
        .expect("delete object");

        assert!(!root.path().join("b/a/b").exists());
        assert!(root.path().join("b/a").is_dir(), "directory object survives");
    }

    #[tokio::test]
    async fn test_should_report_missing_key_on_delete() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let err = fs
            .delete_object(DeleteObjectInput {
                bucket: "b".to_owned(),
                key: "ghost".to_owned(),
            })
            .await
            .expect_err("delete missing");
        assert!(matches!(err, BackendError::NoSuchKey { .. }));
    }

    #[tokio::test]
    async fn test_should_report_per_key_outcomes_in_batch_delete() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "exists", "x").await;

        let out = fs
            .delete_objects(DeleteObjectsInput {
                bucket: "b".to_owned(),
                objects: vec![
                    ObjectIdentifier {
                        key: "exists".to_owned(),
                    },
                    ObjectIdentifier {
                        key: "ghost".to_owned(),
                    },
                ],
            })
            .await
            .expect("batch delete never fails");

        assert_eq!(out.deleted.len(), 1);
        assert_eq!(out.deleted[0].key, "exists");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].key, "ghost");
        assert_eq!(out.errors[0].code, "NoSuchKey");
    }

    #[tokio::test]
    async fn test_should_read_range_boundaries() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "k", "0123456789").await;

        // First byte only.
        assert_eq!(get_range(&fs, "b", "k", "bytes=0-0").await.expect("read"), b"0");
        // Whole object.
        assert_eq!(
            get_range(&fs, "b", "k", "bytes=0-").await.expect("read"),
            b"0123456789"
        );
        // Suffix.
        assert_eq!(get_range(&fs, "b", "k", "bytes=-3").await.expect("read"), b"789");
        // Past EOF is unsatisfiable.
        let err = get_range(&fs, "b", "k", "bytes=10-").await.expect_err("past eof");
        assert!(matches!(err, BackendError::InvalidRange));
    }

    #[tokio::test]
    async fn test_should_report_content_range_for_partial_reads() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "k", "0123456789").await;

        let mut body = Cursor::new(Vec::new());
        let out = fs
            .get_object(
                GetObjectInput {
                    bucket: "b".to_owned(),
                    key: "k".to_owned(),
                    range: Some("bytes=2-5".to_owned()),
                },
                &mut body,
            )
            .await
            .expect("range read");

        assert_eq!(body.into_inner(), b"2345");
        assert_eq!(out.content_length, 4);
        assert_eq!(out.content_range.as_deref(), Some("bytes 2-5/10"));
    }

    #[tokio::test]
    async fn test_should_round_trip_user_metadata() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;

        let mut metadata = HashMap::new();
        metadata.insert("color".to_owned(), "blue".to_owned());
        metadata.insert("shape".to_owned(), "round".to_owned());

        fs.put_object(
            &admin_account(),
            PutObjectInput {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
                content_length: 4,
                body: StreamingBlob::from("data"),
                content_type: Some("text/plain".to_owned()),
                metadata,
                ..PutObjectInput::default()
            },
        )
        .await
        .expect("put with metadata");

        let head = fs
            .head_object(HeadObjectInput {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
                part_number: None,
            })
            .await
            .expect("head");

        assert_eq!(head.metadata.get("color").map(String::as_str), Some("blue"));
        assert_eq!(head.metadata.get("shape").map(String::as_str), Some("round"));
        assert_eq!(head.content_type.as_deref(), Some("text/plain"));
        assert_eq!(head.content_length, 4);
    }

    #[tokio::test]
    async fn test_should_copy_object_across_buckets() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "src").await;
        create_bucket(&fs, "dst").await;

        let mut metadata = HashMap::new();
        metadata.insert("origin".to_owned(), "upload".to_owned());
        let putout = fs
            .put_object(
                &admin_account(),
                PutObjectInput {
                    bucket: "src".to_owned(),
                    key: "orig".to_owned(),
                    content_length: 7,
                    body: StreamingBlob::from("copy me"),
                    content_type: Some("text/plain".to_owned()),
                    content_encoding: Some("identity".to_owned()),
                    metadata,
                    ..PutObjectInput::default()
                },
            )
            .await
            .expect("put source");

        let out = fs
            .copy_object(
                &admin_account(),
                CopyObjectInput {
                    bucket: "dst".to_owned(),
                    key: "copied".to_owned(),
                    copy_source: "src/orig".to_owned(),
                    metadata: HashMap::new(),
                },
            )
            .await
            .expect("copy");

        assert_eq!(out.copy_object_result.etag, putout.etag);

        let (body, copied) = get(&fs, "dst", "copied").await;
        assert_eq!(body, b"copy me");

        // Content type, encoding, and user metadata survive the copy.
        assert_eq!(copied.content_type.as_deref(), Some("text/plain"));
        assert_eq!(copied.content_encoding.as_deref(), Some("identity"));
        assert_eq!(
            copied.metadata.get("origin").map(String::as_str),
            Some("upload")
        );

        // Source is untouched.
        let (src_body, _out) = get(&fs, "src", "orig").await;
        assert_eq!(src_body, b"copy me");
    }

    #[tokio::test]
    async fn test_should_reject_self_copy_with_identical_metadata() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "k", "data").await;

        let err = fs
            .copy_object(
                &admin_account(),
                CopyObjectInput {
                    bucket: "b".to_owned(),
                    key: "k".to_owned(),
                    copy_source: "b/k".to_owned(),
                    metadata: HashMap::new(),
                },
            )
            .await
            .expect_err("self copy");
        assert!(matches!(err, BackendError::InvalidCopyDest));
    }

    #[tokio::test]
    async fn test_should_replace_metadata_on_self_copy() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "k", "data").await;

        let mut metadata = HashMap::new();
        metadata.insert("rev".to_owned(), "2".to_owned());

        fs.copy_object(
            &admin_account(),
            CopyObjectInput {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
                copy_source: "b/k".to_owned(),
                metadata,
            },
        )
        .await
        .expect("metadata rewrite");

        let (body, out) = get(&fs, "b", "k").await;
        assert_eq!(body, b"data", "body unchanged");
        assert_eq!(out.metadata.get("rev").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_should_return_attributes_for_existing_object() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        let putout = put(&fs, "b", "k", "hello").await;

        let attrs = fs
            .get_object_attributes(GetObjectAttributesInput {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
                ..Default::default()
            })
            .await
            .expect("attributes");

        assert_eq!(attrs.etag.as_deref(), Some(putout.etag.as_str()));
        assert_eq!(attrs.object_size, Some(5));
        assert!(attrs.object_parts.is_none());
    }
}
