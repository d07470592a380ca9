//! reqwest-backed implementation of [`PhotoApi`]
//!
//! Every request carries the `x-api-key` header. With `debug_http` enabled
//! the method, path, request body, status and response body of every call
//! are logged at debug level.

use super::client::PhotoApi;
use super::error::ApiError;
use super::types::{
    AssetBulkUpdateRequest, AssetResponse, MetadataSearchRequest, MetadataSearchResponse,
    ServerVersion, StackCreateRequest, TimeBucket,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

const API_KEY_HEADER: &str = "x-api-key";
const TIMELINE_BUCKET_SIZE: &str = "MONTH";

/// Options for building an [`ImmichClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub insecure_tls: bool,
    pub debug_http: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            insecure_tls: false,
            debug_http: false,
        }
    }
}

/// HTTP client for an Immich server
pub struct ImmichClient {
    /// Base URL including the `/api` prefix, without a trailing slash
    endpoint: String,
    http_client: Client,
    timeout: Duration,
    debug_http: bool,
}

impl ImmichClient {
    pub fn new(endpoint: &str, api_key: &str, options: ClientOptions) -> Result<Self, ApiError> {
        let mut api_key_value =
            HeaderValue::from_str(api_key).map_err(|e| ApiError::Transport {
                operation: "client setup".to_string(),
                message: format!("API key is not a valid header value: {}", e),
            })?;
        api_key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key_value);

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_tls)
            .build()
            .map_err(|e| ApiError::Transport {
                operation: "client setup".to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http_client,
            timeout: options.timeout,
            debug_http: options.debug_http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Sends a request and returns the body once the status matches `expected`
    async fn execute<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<String, ApiError> {
        let mut request: RequestBuilder = self.http_client.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!("{} timed out after {:?}", operation, self.timeout);
                ApiError::Timeout {
                    operation: operation.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else if e.is_connect() {
                error!("Cannot connect to Immich at {}", self.endpoint);
                ApiError::Transport {
                    operation: operation.to_string(),
                    message: format!("Connection failed: {}", e),
                }
            } else {
                ApiError::Transport {
                    operation: operation.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| ApiError::Transport {
            operation: operation.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if self.debug_http {
            let request_body = body
                .and_then(|body| serde_json::to_string(body).ok())
                .unwrap_or_default();
            debug!(
                method = %method,
                path = path,
                req_body = %request_body,
                resp_body = %response_body,
                status = status.as_u16(),
                "Request"
            );
        }

        if status != expected {
            return Err(ApiError::UnexpectedStatus {
                operation: operation.to_string(),
                expected: expected.as_u16(),
                actual: status.as_u16(),
                body: response_body,
            });
        }

        Ok(response_body)
    }

    fn decode<T: DeserializeOwned>(operation: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Decode {
            operation: operation.to_string(),
            message: format!("JSON parse error: {}", e),
        })
    }
}

#[async_trait]
impl PhotoApi for ImmichClient {
    async fn server_version(&self) -> Result<ServerVersion, ApiError> {
        let operation = "server version";
        let body = self
            .execute::<()>(operation, Method::GET, "server/version", &[], None, StatusCode::OK)
            .await?;
        Self::decode(operation, &body)
    }

    async fn time_buckets(&self) -> Result<Vec<TimeBucket>, ApiError> {
        let operation = "list time buckets";
        let query = [("size", TIMELINE_BUCKET_SIZE), ("withStacked", "true")];
        let body = self
            .execute::<()>(
                operation,
                Method::GET,
                "timeline/buckets",
                &query,
                None,
                StatusCode::OK,
            )
            .await?;
        Self::decode(operation, &body)
    }

    async fn time_bucket(&self, time_bucket: &str) -> Result<Vec<AssetResponse>, ApiError> {
        let operation = "get time bucket";
        let query = [
            ("timeBucket", time_bucket),
            ("size", TIMELINE_BUCKET_SIZE),
            ("withStacked", "true"),
        ];
        let body = self
            .execute::<()>(
                operation,
                Method::GET,
                "timeline/bucket",
                &query,
                None,
                StatusCode::OK,
            )
            .await?;
        Self::decode(operation, &body)
    }

    async fn search_metadata(
        &self,
        request: MetadataSearchRequest,
    ) -> Result<MetadataSearchResponse, ApiError> {
        let operation = "search metadata";
        let body = self
            .execute(
                operation,
                Method::POST,
                "search/metadata",
                &[],
                Some(&request),
                StatusCode::OK,
            )
            .await?;
        Self::decode(operation, &body)
    }

    async fn create_stack(&self, request: StackCreateRequest) -> Result<(), ApiError> {
        self.execute(
            "create stack",
            Method::POST,
            "stacks",
            &[],
            Some(&request),
            StatusCode::CREATED,
        )
        .await
        .map(|_| ())
    }

    async fn update_assets(&self, request: AssetBulkUpdateRequest) -> Result<(), ApiError> {
        self.execute(
            "update assets",
            Method::PUT,
            "assets",
            &[],
            Some(&request),
            StatusCode::NO_CONTENT,
        )
        .await
        .map(|_| ())
    }

    fn describe(&self) -> String {
        format!("Immich @ {}", self.endpoint)
    }
}

impl fmt::Debug for ImmichClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmichClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("debug_http", &self.debug_http)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use uuid::Uuid;

    const NO_CONTENT: &str = "HTTP/1.1 204 No Content\r\nconnection: close\r\n\r\n";

    fn json_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    /// Reads one HTTP/1.1 request, headers plus `content-length` bytes of body
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).into_owned();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Accepts a single connection, answers with `response` and yields the raw request
    async fn serve_once(response: String) -> (ImmichClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        let client = ImmichClient::new(&endpoint, "secret", ClientOptions::default()).unwrap();
        (client, handle)
    }

    fn request_line(request: &str) -> &str {
        request.lines().next().unwrap_or_default()
    }

    fn request_body(request: &str) -> &str {
        request
            .split_once("\r\n\r\n")
            .map(|(_, body)| body)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_server_version_sends_api_key() {
        let (client, server) =
            serve_once(json_response("200 OK", r#"{"major":1,"minor":118,"patch":2}"#)).await;

        let version = client.server_version().await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(version.to_string(), "v1.118.2");
        assert_eq!(request_line(&request), "GET /api/server/version HTTP/1.1");
        assert!(request.to_lowercase().contains("x-api-key: secret"));
    }

    #[tokio::test]
    async fn test_time_buckets_query() {
        let (client, server) = serve_once(json_response(
            "200 OK",
            r#"[{"timeBucket":"2024-01-01T00:00:00.000Z","count":3}]"#,
        ))
        .await;

        let buckets = client.time_buckets().await.unwrap();
        let request = server.await.unwrap();
        let line = request_line(&request);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 3);
        assert!(line.starts_with("GET /api/timeline/buckets?"));
        assert!(line.contains("size=MONTH"));
        assert!(line.contains("withStacked=true"));
    }

    #[tokio::test]
    async fn test_time_bucket_query_encodes_bucket() {
        let (client, server) = serve_once(json_response("200 OK", "[]")).await;

        let assets = client.time_bucket("2024-01-01T00:00:00.000Z").await.unwrap();
        let request = server.await.unwrap();
        let line = request_line(&request);

        assert!(assets.is_empty());
        assert!(line.starts_with("GET /api/timeline/bucket?"));
        assert!(line.contains("timeBucket=2024-01-01T00%3A00%3A00.000Z"));
        assert!(line.contains("size=MONTH"));
        assert!(line.contains("withStacked=true"));
    }

    #[tokio::test]
    async fn test_search_metadata_posts_page_request() {
        let (client, server) = serve_once(json_response(
            "200 OK",
            r#"{"assets":{"items":[],"nextPage":null,"total":0,"count":0}}"#,
        ))
        .await;

        let response = client
            .search_metadata(MetadataSearchRequest {
                page: 2,
                size: 250,
                with_stacked: true,
            })
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(response.assets.next_page.is_none());
        assert_eq!(request_line(&request), "POST /api/search/metadata HTTP/1.1");
        assert_eq!(
            request_body(&request),
            r#"{"page":2,"size":250,"withStacked":true}"#
        );
    }

    #[tokio::test]
    async fn test_create_stack_expects_created() {
        let (client, server) = serve_once(json_response("201 Created", "{}")).await;
        let parent = Uuid::new_v4();
        let member = Uuid::new_v4();

        client
            .create_stack(StackCreateRequest {
                asset_ids: vec![parent, member],
            })
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(request_line(&request), "POST /api/stacks HTTP/1.1");
        assert!(request
            .to_lowercase()
            .contains("content-type: application/json"));
        assert_eq!(
            request_body(&request),
            format!(r#"{{"assetIds":["{}","{}"]}}"#, parent, member)
        );
    }

    #[tokio::test]
    async fn test_create_stack_server_error_is_unexpected_status() {
        let (client, server) =
            serve_once(json_response("500 Internal Server Error", r#"{"message":"boom"}"#)).await;

        let err = client
            .create_stack(StackCreateRequest {
                asset_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            })
            .await
            .unwrap_err();
        server.await.unwrap();

        assert_eq!(err.status_code(), Some(500));
        match err {
            ApiError::UnexpectedStatus { expected, body, .. } => {
                assert_eq!(expected, 201);
                assert!(body.contains("boom"));
            }
            other => panic!("Expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_stack_rejects_plain_ok() {
        let (client, server) = serve_once(json_response("200 OK", "{}")).await;

        let err = client
            .create_stack(StackCreateRequest {
                asset_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            })
            .await
            .unwrap_err();
        server.await.unwrap();

        assert_eq!(err.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_update_assets_expects_no_content() {
        let (client, server) = serve_once(NO_CONTENT.to_string()).await;
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();

        client
            .update_assets(AssetBulkUpdateRequest {
                ids: vec![child],
                stack_parent_id: parent,
            })
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(request_line(&request), "PUT /api/assets HTTP/1.1");
        assert_eq!(
            request_body(&request),
            format!(r#"{{"ids":["{}"],"stackParentId":"{}"}}"#, child, parent)
        );
    }

    #[tokio::test]
    async fn test_update_assets_rejects_ok() {
        let (client, server) = serve_once(json_response("200 OK", "[]")).await;

        let err = client
            .update_assets(AssetBulkUpdateRequest {
                ids: vec![Uuid::new_v4()],
                stack_parent_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        server.await.unwrap();

        assert_eq!(err.status_code(), Some(200));
        assert_eq!(err.operation(), "update assets");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let (client, server) = serve_once(json_response("200 OK", "not json")).await;

        let err = client.server_version().await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let client = ImmichClient::new(&endpoint, "secret", ClientOptions::default()).unwrap();
        let err = client.server_version().await.unwrap_err();

        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = ImmichClient::new(
            "http://localhost:2283/api/",
            "secret",
            ClientOptions::default(),
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:2283/api");
        assert_eq!(
            client.url("server/version"),
            "http://localhost:2283/api/server/version"
        );
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        let result = ImmichClient::new("http://localhost:2283/api", "bad\nkey", ClientOptions::default());
        assert!(matches!(result, Err(ApiError::Transport { .. })));
    }

    #[test]
    fn test_debug_impl_hides_api_key() {
        let client =
            ImmichClient::new("http://localhost:2283/api", "secret", ClientOptions::default())
                .unwrap();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("ImmichClient"));
        assert!(debug_str.contains("localhost:2283"));
        assert!(!debug_str.contains("secret"));
    }

    #[test]
    fn test_describe() {
        let client =
            ImmichClient::new("http://immich/api", "k", ClientOptions::default()).unwrap();
        assert_eq!(client.describe(), "Immich @ http://immich/api");
    }

    #[test]
    fn test_decode_error() {
        let result: Result<ServerVersion, ApiError> = ImmichClient::decode("server version", "{");
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
