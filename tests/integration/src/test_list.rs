//! Listing (v1/v2 paging, delimiter, internal-state hiding) tests.

#[cfg(test)]
mod tests {
    use fsgate_posix::Backend;
    use fsgate_s3_model::input::{ListObjectsInput, ListObjectsV2Input};

    use crate::{create_bucket, put, test_backend};

    fn keys(contents: &[fsgate_s3_model::types::Object]) -> Vec<&str> {
        contents.iter().map(|o| o.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_should_page_v2_without_overlap_or_gap() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["a", "b", "c", "d"] {
            put(&fs, "b", key, "x").await;
        }

        let page1 = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                max_keys: Some(2),
                ..Default::default()
            })
            .await
            .expect("page 1");
        assert_eq!(keys(&page1.contents), vec!["a", "b"]);
        assert!(page1.is_truncated);
        assert_eq!(page1.next_continuation_token, "b");
        assert_eq!(page1.key_count, 2);

        let page2 = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                max_keys: Some(2),
                continuation_token: Some(page1.next_continuation_token),
                ..Default::default()
            })
            .await
            .expect("page 2");
        assert_eq!(keys(&page2.contents), vec!["c", "d"]);
        assert!(!page2.is_truncated);
    }

    #[tokio::test]
    async fn test_should_page_v1_with_marker() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["p/1", "p/2", "p/3"] {
            put(&fs, "b", key, "x").await;
        }

        let page = fs
            .list_objects(ListObjectsInput {
                bucket: "b".to_owned(),
                marker: Some("p/1".to_owned()),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(keys(&page.contents), vec!["p/2", "p/3"]);
        assert_eq!(page.marker, "p/1");
    }

    #[tokio::test]
    async fn test_should_group_keys_into_common_prefixes() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["photos/2023/a.jpg", "photos/2024/b.jpg", "readme"] {
            put(&fs, "b", key, "x").await;
        }

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                delimiter: Some("/".to_owned()),
                ..Default::default()
            })
            .await
            .expect("list");

        assert_eq!(listed.common_prefixes, vec!["photos/"]);
        assert_eq!(keys(&listed.contents), vec!["readme"]);

        // No member of CommonPrefixes also appears in Contents.
        for cp in &listed.common_prefixes {
            assert!(listed.contents.iter().all(|o| &o.key != cp));
        }
    }

    #[tokio::test]
    async fn test_should_emit_one_prefix_per_segment() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["a/1", "a/2", "a/3", "b/1", "b/2"] {
            put(&fs, "b", key, "x").await;
        }

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                delimiter: Some("/".to_owned()),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(listed.common_prefixes, vec!["a/", "b/"]);
        assert!(listed.contents.is_empty());
    }

    #[tokio::test]
    async fn test_should_list_under_prefix_with_delimiter() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["photos/2023/a.jpg", "photos/2023/b.jpg", "photos/index"] {
            put(&fs, "b", key, "x").await;
        }

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                prefix: Some("photos/".to_owned()),
                delimiter: Some("/".to_owned()),
                ..Default::default()
            })
            .await
            .expect("list");

        assert_eq!(listed.common_prefixes, vec!["photos/2023/"]);
        assert_eq!(keys(&listed.contents), vec!["photos/index"]);
    }

    #[tokio::test]
    async fn test_should_never_list_internal_state() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "visible", "x").await;

        // Leave multipart staging behind.
        fs.create_multipart_upload(fsgate_s3_model::input::CreateMultipartUploadInput {
            bucket: "b".to_owned(),
            key: "pending".to_owned(),
            ..Default::default()
        })
        .await
        .expect("create upload");

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(keys(&listed.contents), vec!["visible"]);
        assert!(listed.common_prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_should_use_greater_of_start_after_and_token() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        for key in ["a", "b", "c", "d"] {
            put(&fs, "b", key, "x").await;
        }

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                continuation_token: Some("a".to_owned()),
                start_after: Some("b".to_owned()),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(keys(&listed.contents), vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_should_skip_unmarked_directories_but_list_their_files() {
        let (_root, fs) = test_backend();
        create_bucket(&fs, "b").await;
        put(&fs, "b", "dir/file", "x").await;

        let listed = fs
            .list_objects_v2(ListObjectsV2Input {
                bucket: "b".to_owned(),
                ..Default::default()
            })
            .await
            .expect("list");

        // "dir" was created incidentally: not an object, but descended.
        assert_eq!(keys(&listed.contents), vec!["dir/file"]);
    }
}
