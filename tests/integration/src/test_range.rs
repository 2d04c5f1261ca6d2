//! Range request integration tests, over raw HTTP.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use reqwest::StatusCode;

    use crate::{cleanup_bucket, create_test_bucket, endpoint_url, http_client, s3_client};

    async fn put_digits(client: &aws_sdk_s3::Client, bucket: &str) {
        client
            .put_object()
            .bucket(bucket)
            .key("digits.txt")
            .body(ByteStream::from_static(b"0123456789"))
            .send()
            .await
            .expect("put_object");
    }

    async fn ranged_get(bucket: &str, range: &str) -> reqwest::Response {
        http_client()
            .get(format!("{}/{bucket}/digits.txt", endpoint_url()))
            .header("Range", range)
            .send()
            .await
            .expect("ranged GET")
    }

    fn header(resp: &reqwest::Response, name: &str) -> Option<String> {
        resp.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_explicit_range() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "range").await;
        put_digits(&client, &bucket).await;

        let resp = ranged_get(&bucket, "bytes=2-5").await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&resp, "content-range").as_deref(), Some("bytes 2-5/10"));
        assert_eq!(header(&resp, "content-length").as_deref(), Some("4"));
        assert_eq!(resp.bytes().await.expect("body").as_ref(), b"2345");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_treat_zero_finish_as_end() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "rangeend").await;
        put_digits(&client, &bucket).await;

        let resp = ranged_get(&bucket, "bytes=5-0").await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&resp, "content-range").as_deref(), Some("bytes 5-9/10"));
        assert_eq!(resp.bytes().await.expect("body").as_ref(), b"56789");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsatisfiable_range() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "range416").await;
        put_digits(&client, &bucket).await;

        let resp = ranged_get(&bucket, "bytes=20-30").await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>InvalidRange</Code>"));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_range_through_sdk() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "rangesdk").await;
        put_digits(&client, &bucket).await;

        let resp = client
            .get_object()
            .bucket(&bucket)
            .key("digits.txt")
            .range("bytes=7-")
            .send()
            .await
            .expect("get_object");
        assert_eq!(resp.content_range(), Some("bytes 7-9/10"));
        let data = resp.body.collect().await.expect("collect").into_bytes();
        assert_eq!(data.as_ref(), b"789");

        cleanup_bucket(&client, &bucket).await;
    }
}
