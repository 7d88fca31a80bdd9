use crate::request::{Body, HttpRequest};
use anyhow::{Context, anyhow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub async fn execute(req: &HttpRequest) -> anyhow::Result<HttpResponse> {
    // Important: without an explicit timeout, a dead endpoint would hold the
    // session in its submitting state forever.
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .context("build http client")?;

    let mut headers = HeaderMap::new();
    for (k, v) in &req.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name: {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let builder = match req.method.as_str() {
        "GET" => client.get(&req.url),
        "POST" => client.post(&req.url),
        "PUT" => client.put(&req.url),
        "DELETE" => client.delete(&req.url),
        other => return Err(anyhow!("unsupported method: {other}")),
    }
    .headers(headers);

    let builder = match &req.body {
        Body::Empty => builder,
        Body::Json(s) => builder.body(s.clone()),
        Body::MultipartFormData { bytes, .. } => builder.body(bytes.clone()),
    };

    let resp = builder.send().await.context("http request failed")?;
    let status = resp.status().as_u16();
    let body = resp
        .bytes()
        .await
        .context("failed reading response body")?
        .to_vec();

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use viva_core::SessionId;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn executes_multipart_requests_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/join_test"))
            .and(header("Authorization", "tok-123"))
            .and(body_string_contains("name=\"test_id\""))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"domain":"Networking"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let req = crate::interview::build_join_request(
            &server.uri(),
            &SessionId::new("t-1"),
            "tok-123",
        );
        let resp = execute(&req).await.unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, br#"{"domain":"Networking"}"#);
    }

    #[tokio::test]
    async fn surfaces_transport_failures() {
        // Nothing listens here; the send itself must fail, not hang.
        let req = HttpRequest {
            method: "POST".into(),
            url: "http://127.0.0.1:1/unreachable".into(),
            headers: Vec::new(),
            body: Body::Empty,
        };
        assert!(execute(&req).await.is_err());
    }
}
