//! HTTP client for the attendance service

use async_trait::async_trait;
use attend_api::{AttendanceRecord, CheckInResponse};
use attend_util::SessionToken;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{AttendanceApi, RemoteError, RemoteResult, TOKEN_HEADER};

/// Attendance service reached over HTTP(S)
pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
}

impl HttpAttendanceApi {
    /// Create a client for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> RemoteResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(path, error = %e, "Attendance request failed");
            RemoteError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "Attendance response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Map a non-success status to the matching error
fn classify_status(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized,
        other => RemoteError::Status {
            code: other.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn list_attendance(&self, token: &SessionToken) -> RemoteResult<Vec<AttendanceRecord>> {
        let request = self
            .client
            .get(self.url("attendance"))
            .header(TOKEN_HEADER, token.expose());
        let response = self.send(request, "attendance").await?;
        Self::decode(response).await
    }

    async fn check_in(&self, token: &SessionToken) -> RemoteResult<CheckInResponse> {
        let request = self
            .client
            .post(self.url("checkin"))
            .header(TOKEN_HEADER, token.expose())
            .json(&serde_json::json!({}));
        let response = self.send(request, "checkin").await?;
        Self::decode(response).await
    }

    async fn check_out(&self, token: &SessionToken) -> RemoteResult<()> {
        let request = self
            .client
            .post(self.url("checkout"))
            .header(TOKEN_HEADER, token.expose())
            .json(&serde_json::json!({}));
        // Body is not inspected
        self.send(request, "checkout").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and hand back the raw request head
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            // Read the head, then whatever body Content-Length announces
            let head_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while request.len() < head_end + content_length {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            head
        });

        (base, handle)
    }

    fn token() -> SessionToken {
        SessionToken::new("tok-123").unwrap()
    }

    #[test]
    fn trailing_slash_trimmed() {
        let api = HttpAttendanceApi::new("https://example.com/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "https://example.com/api");
        assert_eq!(api.url("attendance"), "https://example.com/api/attendance");
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            RemoteError::Unauthorized
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, String::new()),
            RemoteError::Unauthorized
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            RemoteError::Status {
                code: 500,
                body: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn list_sends_token_header() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"date":"2025-03-10","checkIn":"2025-03-10T09:00:00Z"}]"#,
        )
        .await;
        let api = HttpAttendanceApi::new(base, Duration::from_secs(5)).unwrap();

        let records = api.list_attendance(&token()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_open());

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /attendance "));
        assert!(head.contains("x-employee-token: tok-123"));
    }

    #[tokio::test]
    async fn check_in_decodes_notification() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"message":"Checked in successfully","notification":{"title":"Hi","body":"Welcome"}}"#,
        )
        .await;
        let api = HttpAttendanceApi::new(base, Duration::from_secs(5)).unwrap();

        let response = api.check_in(&token()).await.unwrap();
        assert!(response.is_confirmed());
        assert_eq!(response.notification_or_default().title, "Hi");

        let head = server.await.unwrap().to_lowercase();
        assert!(head.starts_with("post /checkin "));
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"message":"Invalid token"}"#).await;
        let api = HttpAttendanceApi::new(base, Duration::from_secs(5)).unwrap();

        let err = api.check_out(&token()).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "not json").await;
        let api = HttpAttendanceApi::new(base, Duration::from_secs(5)).unwrap();

        let err = api.list_attendance(&token()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let api = HttpAttendanceApi::new(base, Duration::from_secs(2)).unwrap();
        let err = api.list_attendance(&token()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Network(_)));
    }
}
