//! Bucket lifecycle integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_list_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "create").await;

        let resp = client.list_buckets().send().await.expect("list_buckets");
        let names: Vec<&str> = resp.buckets().iter().filter_map(|b| b.name()).collect();
        assert!(names.contains(&bucket.as_str()), "bucket should be listed");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_bucket_idempotently() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "idem").await;

        client
            .create_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("second create_bucket should succeed");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_bucket_with_contents() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delete").await;
        client
            .put_object()
            .bucket(&bucket)
            .key("leftover.txt")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect("put_object");

        client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete_bucket");

        let result = client.list_objects().bucket(&bucket).send().await;
        assert!(result.is_err(), "deleted bucket should not be listable");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_ignore_delete_of_missing_bucket() {
        let client = s3_client();
        client
            .delete_bucket()
            .bucket(test_bucket_name("never"))
            .send()
            .await
            .expect("delete of a missing bucket should still succeed");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_implicitly_create_bucket_on_put() {
        let client = s3_client();
        let bucket = test_bucket_name("implicit");

        client
            .put_object()
            .bucket(&bucket)
            .key("first.txt")
            .body(ByteStream::from_static(b"first"))
            .send()
            .await
            .expect("put into a missing bucket should succeed");

        let resp = client.list_buckets().send().await.expect("list_buckets");
        assert!(
            resp.buckets()
                .iter()
                .any(|b| b.name() == Some(bucket.as_str()))
        );

        cleanup_bucket(&client, &bucket).await;
    }
}
