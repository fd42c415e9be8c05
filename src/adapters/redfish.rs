//! Live Redfish Connector Adapter
//!
//! Implements the `RedfishConnector` port against a BMC over HTTPS using
//! basic authentication.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::ports::{RedfishConnector, REDFISH_BASE_PATH};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a live Redfish endpoint
#[derive(Clone)]
pub struct RedfishConfig {
    /// BMC base URL, e.g. `https://idrac.example.com`
    pub base_url: String,

    /// Basic auth user
    pub username: String,

    /// Basic auth password
    pub password: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Verify the BMC's TLS certificate
    pub verify_tls: bool,
}

impl Default for RedfishConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost".to_string(),
            username: "root".to_string(),
            password: String::new(),
            timeout: Duration::from_secs(30),
            verify_tls: false,
        }
    }
}

impl std::fmt::Debug for RedfishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedfishConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Fetches Redfish documents from a live BMC.
pub struct HttpRedfishConnector {
    config: RedfishConfig,
    client: Client,
}

impl HttpRedfishConnector {
    /// Create a new connector
    pub fn new(config: RedfishConfig) -> Result<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Redfish URL must start with http:// or https://: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Full URL for a path relative to the API root.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.config.base_url.trim_end_matches('/'),
            REDFISH_BASE_PATH,
            path
        )
    }

    /// Check that the Redfish service root answers.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        self.get("").await.map(|_| ())
    }
}

impl std::fmt::Debug for HttpRedfishConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRedfishConnector")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl RedfishConnector for HttpRedfishConnector {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|source| Error::UpstreamFetch {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| Error::UpstreamDecode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("redfish ({})", self.config.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RAID_CONTROLLERS_PATH;
    use assert_matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request with a canned response; the task yields the raw
    /// request head.
    async fn canned_bmc(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{}", addr), task)
    }

    fn header<'a>(request: &'a str, name: &str) -> Option<&'a str> {
        request.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn test_config(base_url: &str) -> RedfishConfig {
        RedfishConfig {
            base_url: base_url.to_string(),
            username: "root".to_string(),
            password: "calvin".to_string(),
            timeout: Duration::from_secs(1),
            verify_tls: false,
        }
    }

    #[test]
    fn test_redfish_config_default() {
        let config = RedfishConfig::default();

        assert_eq!(config.base_url, "https://localhost");
        assert_eq!(config.username, "root");
        assert!(config.password.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let debug = format!("{:?}", test_config("https://bmc"));
        assert!(!debug.contains("calvin"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_url_for_joins_api_root() {
        let conn = HttpRedfishConnector::new(test_config("https://bmc.example.com/")).unwrap();

        assert_eq!(
            conn.url_for(RAID_CONTROLLERS_PATH),
            "https://bmc.example.com/redfish/v1/Systems/System.Embedded.1/Storage/Controllers"
        );
        assert_eq!(conn.url_for(""), "https://bmc.example.com/redfish/v1");
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let err = HttpRedfishConnector::new(test_config("bmc.example.com")).unwrap_err();
        assert_matches!(err, Error::Config(_));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let conn = HttpRedfishConnector::new(test_config("http://localhost:19999")).unwrap();

        let result = conn.get(RAID_CONTROLLERS_PATH).await;
        assert_matches!(result, Err(Error::UpstreamFetch { ref path, .. }) if path == RAID_CONTROLLERS_PATH);
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let conn = HttpRedfishConnector::new(test_config("http://localhost:19999")).unwrap();
        assert!(conn.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_get_sends_basic_auth_and_decodes_json() {
        let (url, bmc) = canned_bmc("200 OK", r#"{"Members":[]}"#).await;
        let conn = HttpRedfishConnector::new(test_config(&url)).unwrap();

        let doc = conn.get(RAID_CONTROLLERS_PATH).await.unwrap();
        assert_eq!(doc["Members"], serde_json::json!([]));

        let request = bmc.await.unwrap();
        assert!(request.starts_with(
            "GET /redfish/v1/Systems/System.Embedded.1/Storage/Controllers HTTP/1.1"
        ));
        // root:calvin
        assert_eq!(header(&request, "authorization"), Some("Basic cm9vdDpjYWx2aW4="));
        assert_eq!(header(&request, "accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let (url, bmc) = canned_bmc("401 Unauthorized", r#"{"error":"denied"}"#).await;
        let conn = HttpRedfishConnector::new(test_config(&url)).unwrap();

        let result = conn.get(RAID_CONTROLLERS_PATH).await;

        assert_matches!(
            result,
            Err(Error::UpstreamStatus { ref path, status: 401 }) if path == RAID_CONTROLLERS_PATH
        );
        bmc.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let (url, bmc) = canned_bmc("503 Service Unavailable", "").await;
        let conn = HttpRedfishConnector::new(test_config(&url)).unwrap();

        assert_matches!(
            conn.get(RAID_CONTROLLERS_PATH).await,
            Err(Error::UpstreamStatus { status: 503, .. })
        );
        bmc.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let (url, bmc) = canned_bmc("200 OK", "hello").await;
        let conn = HttpRedfishConnector::new(test_config(&url)).unwrap();

        let result = conn.get(RAID_CONTROLLERS_PATH).await;

        assert_matches!(
            result,
            Err(Error::UpstreamDecode { ref path, .. }) if path == RAID_CONTROLLERS_PATH
        );
        bmc.await.unwrap();
    }

    #[tokio::test]
    async fn test_health_check_hits_service_root() {
        let (url, bmc) = canned_bmc("200 OK", r#"{"RedfishVersion":"1.6.0"}"#).await;
        let conn = HttpRedfishConnector::new(test_config(&url)).unwrap();

        conn.health_check().await.unwrap();

        assert!(bmc.await.unwrap().starts_with("GET /redfish/v1 HTTP/1.1"));
    }
}
