//! Virtual-host addressing and raw-protocol integration tests.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use reqwest::StatusCode;

    use crate::{cleanup_bucket, endpoint_url, http_client, s3_client, test_bucket_name};

    fn host_for(bucket: &str) -> String {
        format!("{bucket}.mock-s3.test")
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_put_and_get_via_virtual_host() {
        let http = http_client();
        let bucket = test_bucket_name("vhost");
        let url = endpoint_url();

        let resp = http
            .put(format!("{url}/dir/file.txt"))
            .header("Host", host_for(&bucket))
            .header("Content-Type", "text/plain")
            .body(Bytes::from_static(b"virtual"))
            .send()
            .await
            .expect("virtual-host PUT");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("etag"));

        // Same object, path-style.
        let resp = http
            .get(format!("{url}/{bucket}/dir/file.txt"))
            .send()
            .await
            .expect("path-style GET");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.bytes().await.expect("body").as_ref(), b"virtual");

        // The virtual host root lists buckets.
        let resp = http
            .get(format!("{url}/"))
            .header("Host", host_for(&bucket))
            .send()
            .await
            .expect("virtual-host root GET");
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<ListAllMyBucketsResult"));
        assert!(body.contains(&format!("<Name>{bucket}</Name>")));

        // DELETE at the virtual host root is rejected like `DELETE /`.
        let resp = http
            .delete(format!("{url}/"))
            .header("Host", host_for(&bucket))
            .send()
            .await
            .expect("virtual-host root DELETE");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        cleanup_bucket(&s3_client(), &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_empty_404_for_missing_object() {
        let resp = http_client()
            .get(format!("{}/{}/missing", endpoint_url(), test_bucket_name("none")))
            .send()
            .await
            .expect("GET");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.bytes().await.expect("body").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_xml_404_for_missing_bucket() {
        let resp = http_client()
            .get(format!("{}/{}", endpoint_url(), test_bucket_name("none")))
            .send()
            .await
            .expect("GET");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.text().await.expect("body").contains("<Code>NoSuchBucket</Code>"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_delete_at_service_root() {
        let resp = http_client()
            .delete(format!("{}/", endpoint_url()))
            .send()
            .await
            .expect("DELETE");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_health_and_common_headers() {
        let resp = http_client()
            .get(format!("{}/_health", endpoint_url()))
            .send()
            .await
            .expect("health GET");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-amz-request-id"));
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("MockS3")
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_404_for_post() {
        let resp = http_client()
            .post(format!("{}/bucket/key", endpoint_url()))
            .body("ignored")
            .send()
            .await
            .expect("POST");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
