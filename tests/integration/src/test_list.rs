//! List objects integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    async fn populate_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
        let keys = [
            "photos/2024/jan/img1.jpg",
            "photos/2024/jan/img2.jpg",
            "photos/2024/feb/img3.jpg",
            "photos/2025/mar/img4.jpg",
            "documents/report.pdf",
            "documents/readme.txt",
            "root.txt",
        ];
        for key in keys {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from_static(b"x"))
                .send()
                .await
                .unwrap_or_else(|e| panic!("put {key}: {e}"));
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_all_objects() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "listall").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .send()
            .await
            .expect("list_objects");

        let keys: Vec<&str> = resp.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(keys.first(), Some(&"documents/readme.txt"));
        assert_eq!(resp.is_truncated(), Some(false));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_with_prefix_and_delimiter() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delim").await;
        populate_bucket(&client, &bucket).await;

        let resp = client
            .list_objects()
            .bucket(&bucket)
            .prefix("photos/")
            .delimiter("/")
            .send()
            .await
            .expect("list_objects");

        assert!(resp.contents().is_empty());
        let prefixes: Vec<&str> = resp
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .collect();
        assert_eq!(prefixes, ["photos/2024/", "photos/2025/"]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_paginate_with_marker() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "page").await;
        populate_bucket(&client, &bucket).await;

        let mut marker: Option<String> = None;
        let mut seen = Vec::new();
        loop {
            let mut req = client.list_objects().bucket(&bucket).max_keys(3);
            if let Some(m) = marker.take() {
                req = req.marker(m);
            }
            let resp = req.send().await.expect("list_objects");
            seen.extend(
                resp.contents()
                    .iter()
                    .filter_map(|o| o.key().map(ToOwned::to_owned)),
            );
            if resp.is_truncated() == Some(true) {
                marker = resp.next_marker().map(ToOwned::to_owned);
                assert!(marker.is_some(), "truncated page should carry NextMarker");
            } else {
                break;
            }
        }
        assert_eq!(seen.len(), 7);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_listing_missing_bucket() {
        let client = s3_client();
        let result = client
            .list_objects()
            .bucket("no-such-bucket-for-listing")
            .send()
            .await;
        let err = result.expect_err("listing should fail");
        let service_err = err.into_service_error();
        assert!(service_err.is_no_such_bucket());
    }
}
