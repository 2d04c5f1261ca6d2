//! Object CRUD integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::ObjectCannedAcl;

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    fn is_quoted_md5(etag: &str) -> bool {
        etag.len() == 34
            && etag.starts_with('"')
            && etag.ends_with('"')
            && etag[1..33].bytes().all(|b| b.is_ascii_hexdigit())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "putget").await;

        let body = b"hello, mocks3!";
        let put = client
            .put_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .body(ByteStream::from_static(body))
            .content_type("text/plain")
            .send()
            .await
            .expect("put_object");
        assert!(put.e_tag().is_some_and(is_quoted_md5));

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("greeting.txt")
            .send()
            .await
            .expect("get_object");

        assert_eq!(resp.content_type(), Some("text/plain"));
        assert_eq!(resp.content_length(), Some(14));
        assert_eq!(resp.accept_ranges(), Some("bytes"));
        assert_eq!(resp.e_tag(), put.e_tag());
        assert!(resp.last_modified().is_some());

        let data = resp
            .body
            .collect()
            .await
            .expect("collect body")
            .into_bytes();
        assert_eq!(data.as_ref(), body);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_head_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "head").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("file.bin")
            .body(ByteStream::from_static(b"binary data"))
            .send()
            .await
            .expect("put_object");

        let resp = client
            .head_object()
            .bucket(&bucket)
            .key("file.bin")
            .send()
            .await
            .expect("head_object");

        assert_eq!(resp.content_length(), Some(11));
        assert_eq!(resp.content_type(), Some("application/octet-stream"));
        assert!(resp.e_tag().is_some_and(is_quoted_md5));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_overwrite_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "overwrite").await;

        for body in [&b"first version"[..], &b"second"[..]] {
            client
                .put_object()
                .bucket(&bucket)
                .key("doc.txt")
                .body(ByteStream::from(body.to_vec()))
                .send()
                .await
                .expect("put_object");
        }

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("doc.txt")
            .send()
            .await
            .expect("get_object");
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"second");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_large_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "large").await;

        // Larger than the default in-memory limit, so the server spills it.
        let body: Vec<u8> = (0..2 * 1024 * 1024_usize)
            .map(|i| u8::try_from(i % 251).unwrap_or_default())
            .collect();
        client
            .put_object()
            .bucket(&bucket)
            .key("big.bin")
            .body(ByteStream::from(body.clone()))
            .send()
            .await
            .expect("put_object");

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("big.bin")
            .send()
            .await
            .expect("get_object");
        assert_eq!(resp.content_length(), Some(2 * 1024 * 1024));
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), body.as_slice());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_to_get_missing_object() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "missing").await;

        let get = client
            .get_object()
            .bucket(&bucket)
            .key("nope")
            .send()
            .await;
        assert!(get.is_err());

        let head = client
            .head_object()
            .bucket(&bucket)
            .key("nope")
            .send()
            .await;
        assert!(head.is_err());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_object_idempotently() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "delobj").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("gone.txt")
            .body(ByteStream::from_static(b"bye"))
            .send()
            .await
            .expect("put_object");

        for _ in 0..2 {
            client
                .delete_object()
                .bucket(&bucket)
                .key("gone.txt")
                .send()
                .await
                .expect("delete_object");
        }

        let get = client
            .get_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await;
        assert!(get.is_err());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_acl_stubs() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "acl").await;

        client
            .put_object()
            .bucket(&bucket)
            .key("acl.txt")
            .body(ByteStream::from_static(b"acl"))
            .send()
            .await
            .expect("put_object");

        client
            .put_object_acl()
            .bucket(&bucket)
            .key("acl.txt")
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .expect("put_object_acl");

        let acl = client
            .get_object_acl()
            .bucket(&bucket)
            .key("acl.txt")
            .send()
            .await
            .expect("get_object_acl");
        assert!(acl.owner().is_some());
        assert_eq!(acl.grants().len(), 1);

        cleanup_bucket(&client, &bucket).await;
    }
}
