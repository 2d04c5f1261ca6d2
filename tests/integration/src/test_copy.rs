//! Server-side copy integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{cleanup_bucket, create_test_bucket, s3_client, test_bucket_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_object_between_buckets() {
        let client = s3_client();
        let src = create_test_bucket(&client, "copysrc").await;
        let dst = test_bucket_name("copydst");

        client
            .put_object()
            .bucket(&src)
            .key("original.json")
            .body(ByteStream::from_static(br#"{"copied":true}"#))
            .content_type("application/json")
            .send()
            .await
            .expect("put_object");

        let copy = client
            .copy_object()
            .bucket(&dst)
            .key("nested/copy.json")
            .copy_source(format!("{src}/original.json"))
            .send()
            .await
            .expect("copy_object into an implicitly created bucket");
        let result = copy.copy_object_result().expect("copy result");
        assert!(result.e_tag().is_some());
        assert!(result.last_modified().is_some());

        let resp = client
            .get_object()
            .bucket(&dst)
            .key("nested/copy.json")
            .send()
            .await
            .expect("get_object");
        assert_eq!(resp.content_type(), Some("application/json"));
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), br#"{"copied":true}"#);

        cleanup_bucket(&client, &src).await;
        cleanup_bucket(&client, &dst).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_keep_copy_after_source_is_deleted() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "copydel").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("a.txt")
            .body(ByteStream::from_static(b"survivor"))
            .send()
            .await
            .expect("put_object");
        client
            .copy_object()
            .bucket(&bucket)
            .key("b.txt")
            .copy_source(format!("/{bucket}/a.txt"))
            .send()
            .await
            .expect("copy_object");
        client
            .delete_object()
            .bucket(&bucket)
            .key("a.txt")
            .send()
            .await
            .expect("delete_object");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("b.txt")
            .send()
            .await
            .expect("get_object");
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"survivor");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_copy_of_missing_source() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "copymiss").await;

        let result = client
            .copy_object()
            .bucket(&bucket)
            .key("copy.txt")
            .copy_source(format!("{bucket}/does-not-exist"))
            .send()
            .await;
        assert!(result.is_err());

        cleanup_bucket(&client, &bucket).await;
    }
}
