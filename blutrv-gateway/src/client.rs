//! Shelly gateway client using the RPC-over-HTTP API.
//!
//! One call to `GET /rpc/Shelly.GetComponents` per poll. The response body is
//! handed to the [`Extractor`] to build a fresh [`ComponentSet`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use blutrv_gateway::GatewayClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::builder()
//!         .address("192.168.1.50")
//!         .credentials("admin", "secret")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let components = client.fetch_components().await?;
//!
//!     for component in &components {
//!         println!("{} -> {}", component.display_key, component.original_key);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use blutrv_types::ComponentSet;
use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::extract::{Extractor, DEFAULT_SUBTYPE};
use crate::GatewayError;

/// RPC method listing every component on the gateway.
pub const COMPONENTS_RPC_PATH: &str = "/rpc/Shelly.GetComponents";

/// Request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one Shelly gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    address: String,
    username: String,
    password: String,
    timeout: Duration,
    extractor: Extractor,
}

impl GatewayClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::default()
    }

    /// The gateway `host:port`.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the components RPC.
    pub fn components_url(&self) -> String {
        format!("http://{}{}", self.address, COMPONENTS_RPC_PATH)
    }

    /// Fetch and normalize the gateway's components.
    ///
    /// Every call performs a fresh request; nothing is cached.
    pub async fn fetch_components(&self) -> Result<ComponentSet, GatewayError> {
        let body = self.fetch_raw().await?;
        let components = self.extractor.extract(&body)?;
        debug!(
            address = %self.address,
            components = components.len(),
            "Extracted gateway components"
        );
        Ok(components)
    }

    /// Perform the RPC call and return the raw response body.
    pub async fn fetch_raw(&self) -> Result<Bytes, GatewayError> {
        let mut request = self
            .client
            .get(self.components_url())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if !self.username.is_empty() || !self.password.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Auth("Invalid credentials".to_string()));
        }

        if !response.status().is_success() {
            return Err(GatewayError::Http(format!(
                "gateway returned status {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?)
    }
}

/// Builder for GatewayClient.
#[derive(Debug, Default)]
pub struct GatewayClientBuilder {
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<Duration>,
    subtype: Option<String>,
}

impl GatewayClientBuilder {
    /// Set the gateway address as `host` or `host:port`.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the username and password for basic authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout (default: 5 seconds; zero means default).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the device sub-type to extract (default: `blutrv`).
    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let timeout = self
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let subtype = self.subtype.unwrap_or_else(|| DEFAULT_SUBTYPE.to_string());

        Ok(GatewayClient {
            client,
            address: self.address.unwrap_or_else(|| "localhost".to_string()),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            timeout,
            extractor: Extractor::new(&subtype),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const BODY: &str = r#"{"components":[{"key":"ble","status":{}},{"key":"blutrv:200","status":{"battery":100,"fw_ver":"v1.2.10"},"config":{"name":"TRV-200"},"attrs":{"flags":17}}],"cfg_rev":29}"#;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn stub_gateway(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (addr, rx)
    }

    #[test]
    fn test_builder_defaults() {
        let client = GatewayClient::builder().build().unwrap();
        assert_eq!(client.address(), "localhost");
        assert_eq!(client.username, "");
        assert_eq!(client.password, "");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.extractor.marker(), "blutrv:");
    }

    #[test]
    fn test_builder_custom() {
        let client = GatewayClient::builder()
            .address("10.0.0.5:8080")
            .credentials("admin", "secret")
            .timeout(Duration::from_secs(2))
            .subtype("bthomedevice")
            .build()
            .unwrap();

        assert_eq!(client.components_url(), "http://10.0.0.5:8080/rpc/Shelly.GetComponents");
        assert_eq!(client.username, "admin");
        assert_eq!(client.password, "secret");
        assert_eq!(client.timeout(), Duration::from_secs(2));
        assert_eq!(client.extractor.marker(), "bthomedevice:");
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let client = GatewayClient::builder()
            .timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_fetch_components() {
        let (addr, request) = stub_gateway("200 OK", BODY).await;
        let client = GatewayClient::builder()
            .address(addr)
            .credentials("u", "p")
            .build()
            .unwrap();

        let components = client.fetch_components().await.unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components.get("TRV-200").unwrap().number("flags"), Ok(Some(17.0)));

        let request = request.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /rpc/shelly.getcomponents http/1.1"));
        assert!(request.contains("accept: application/json"));
        // base64("u:p")
        assert!(request.contains("authorization: basic dtpw"));
    }

    #[tokio::test]
    async fn test_no_credentials_no_auth_header() {
        let (addr, request) = stub_gateway("200 OK", BODY).await;
        let client = GatewayClient::builder().address(addr).build().unwrap();

        client.fetch_raw().await.unwrap();
        let request = request.await.unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_auth_error() {
        let (addr, _request) = stub_gateway("401 Unauthorized", "").await;
        let client = GatewayClient::builder()
            .address(addr)
            .credentials("u", "wrong")
            .build()
            .unwrap();

        let err = client.fetch_components().await.unwrap_err();
        assert!(matches!(err, GatewayError::Auth(_)));
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let (addr, _request) = stub_gateway("500 Internal Server Error", "{}").await;
        let client = GatewayClient::builder().address(addr).build().unwrap();

        let err = client.fetch_components().await.unwrap_err();
        assert!(matches!(err, GatewayError::Http(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (addr, _request) = stub_gateway("200 OK", "{\"components\": [").await;
        let client = GatewayClient::builder().address(addr).build().unwrap();

        let err = client.fetch_components().await.unwrap_err();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = GatewayClient::builder().address(addr).build().unwrap();
        let err = client.fetch_components().await.unwrap_err();
        assert!(err.is_fetch(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_silent_gateway_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = GatewayClient::builder()
            .address(addr)
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = client.fetch_components().await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
    }
}
