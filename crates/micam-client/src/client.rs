//! Config.cgi client implementation

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{ClientConfig, DEFAULT_BASE_URI};
use crate::error::{MiCamClientError, Result, TransportError};
use crate::request::RequestSpec;
use crate::response::DeviceResponse;
use crate::transport::{HttpTransport, Transport, TransportResponse};

/// Dashcam configuration client
///
/// Issues get/set property requests against the device's Config.cgi
/// endpoint, retrying failed attempts with a fixed delay. The client holds
/// no per-request state; clones share the underlying transport.
#[derive(Clone)]
pub struct DeviceConfigClient {
    transport: Arc<dyn Transport>,
    base_uri: String,
    base_url: Url,
    retry_count: u32,
    retry_delay: Duration,
    request_timeout: Duration,
}

impl fmt::Debug for DeviceConfigClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfigClient")
            .field("base_uri", &self.base_uri)
            .field("retry_count", &self.retry_count)
            .field("retry_delay", &self.retry_delay)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl DeviceConfigClient {
    /// Create a client for the device at its stock address
    pub fn new() -> Result<Self> {
        Self::with_base_uri(DEFAULT_BASE_URI)
    }

    /// Create a client for a Config.cgi endpoint at another address
    ///
    /// # Arguments
    /// * `base_uri` - Full endpoint URI (e.g., "http://192.72.1.1/cgi-bin/Config.cgi")
    pub fn with_base_uri(base_uri: &str) -> Result<Self> {
        Self::from_config(ClientConfig::builder().base_uri(base_uri).build())
    }

    /// Create a client from configuration, using the HTTP transport
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.retry.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_uri = config.connection.base_uri;
        let base_url = Url::parse(&base_uri)?;

        info!("Device client created for {}", base_uri);

        Ok(Self {
            transport,
            base_uri,
            base_url,
            retry_count: config.retry.count,
            retry_delay: config.retry.delay(),
            request_timeout: config.retry.timeout(),
        })
    }

    /// Get the Config.cgi URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Set the maximum number of attempts per request
    ///
    /// Zero is accepted; every request then fails without contacting the device.
    pub fn set_retry_count(&mut self, count: u32) {
        self.retry_count = count;
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Set the wait between failed attempts
    pub fn set_retry_delay(&mut self, delay: Duration) {
        self.retry_delay = delay;
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Set the per-attempt timeout
    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    // =========================================================================
    // Property Operations
    // =========================================================================

    /// Read a device property
    pub async fn get(&self, property_name: &str) -> Result<DeviceResponse> {
        self.get_with_cancel(property_name, &CancellationToken::new()).await
    }

    /// Read a device property, aborting when `cancel` fires
    #[instrument(skip(self, cancel))]
    pub async fn get_with_cancel(
        &self,
        property_name: &str,
        cancel: &CancellationToken,
    ) -> Result<DeviceResponse> {
        self.execute(RequestSpec::get(property_name), cancel).await
    }

    /// Write a device property
    ///
    /// The value is sent in its `Display` form.
    pub async fn set(
        &self,
        property_name: &str,
        value: impl fmt::Display,
    ) -> Result<DeviceResponse> {
        self.set_with_cancel(property_name, value, &CancellationToken::new())
            .await
    }

    /// Write a device property, aborting when `cancel` fires
    #[instrument(skip(self, value, cancel), fields(value = %value))]
    pub async fn set_with_cancel(
        &self,
        property_name: &str,
        value: impl fmt::Display,
        cancel: &CancellationToken,
    ) -> Result<DeviceResponse> {
        self.execute(RequestSpec::set(property_name, value), cancel).await
    }

    // =========================================================================
    // Low-level Requests
    // =========================================================================

    /// Issue a request to an arbitrary device endpoint
    ///
    /// `uri` may be absolute, or relative to the device: a path starting with
    /// `/` is appended to the device origin and a query starting with `?` is
    /// appended to the Config.cgi URI. The property name is only taken from
    /// the response body.
    pub async fn request(&self, uri: &str) -> Result<DeviceResponse> {
        self.request_with_cancel(uri, &CancellationToken::new()).await
    }

    /// Issue a low-level request, aborting when `cancel` fires
    #[instrument(skip(self, cancel))]
    pub async fn request_with_cancel(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<DeviceResponse> {
        let uri = self.resolve_uri(uri)?;
        let response = self.send_with_retry(&uri, cancel).await?;
        DeviceResponse::parse(&response.body, None)
    }

    /// Send a single attempt and return the unparsed answer
    ///
    /// No retry is performed. A non-2xx status is reported as a
    /// communication failure after one attempt.
    pub async fn raw_request(&self, uri: &str) -> Result<TransportResponse> {
        self.raw_request_with_cancel(uri, &CancellationToken::new()).await
    }

    /// Send a single attempt, aborting when `cancel` fires
    #[instrument(skip(self, cancel))]
    pub async fn raw_request_with_cancel(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let uri = self.resolve_uri(uri)?;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MiCamClientError::Cancelled),
            outcome = self.attempt(&uri) => outcome,
        };
        outcome.map_err(|e| MiCamClientError::communication(1, Some(e)))
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    async fn execute(
        &self,
        spec: RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<DeviceResponse> {
        let uri = spec.to_uri(&self.base_uri);
        let response = self.send_with_retry(&uri, cancel).await?;
        DeviceResponse::parse(&response.body, Some(&spec.property))
    }

    /// Run the attempt loop until a 2xx answer, exhaustion or cancellation
    async fn send_with_retry(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let mut last_error = None;

        for attempt in 1..=self.retry_count {
            if attempt > 1 {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(MiCamClientError::Cancelled),
                    _ = tokio::time::sleep(self.retry_delay) => {}
                }
            }

            debug!(attempt, max_attempts = self.retry_count, "GET {}", uri);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MiCamClientError::Cancelled),
                outcome = self.attempt(uri) => outcome,
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(attempt, "Device request failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(MiCamClientError::communication(self.retry_count, last_error))
    }

    /// One bounded GET; anything outside 2xx is a failure
    async fn attempt(&self, uri: &str) -> std::result::Result<TransportResponse, TransportError> {
        let response = tokio::time::timeout(
            self.request_timeout,
            self.transport.get(uri, self.request_timeout),
        )
        .await
        .map_err(|_| TransportError::Timeout)??;

        if response.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status(response.status))
        }
    }

    fn resolve_uri(&self, uri: &str) -> Result<String> {
        match Url::parse(uri) {
            Ok(_) => Ok(uri.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                if uri.starts_with('/') {
                    let origin = self.base_url.origin().ascii_serialization();
                    Ok(format!("{}{}", origin, uri))
                } else if uri.starts_with('?') {
                    Ok(format!("{}{}", self.base_uri, uri))
                } else {
                    Ok(self.base_url.join(uri)?.to_string())
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn get(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> std::result::Result<TransportResponse, TransportError> {
            Ok(TransportResponse::ok("1\nok"))
        }
    }

    fn client() -> DeviceConfigClient {
        DeviceConfigClient::with_transport(ClientConfig::default(), Arc::new(NullTransport))
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = DeviceConfigClient::new().unwrap();
        assert_eq!(client.base_uri(), "http://192.72.1.1/cgi-bin/Config.cgi");
        assert_eq!(client.retry_count(), 3);
        assert_eq!(client.retry_delay(), Duration::from_secs(3));
        assert_eq!(client.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_url() {
        let err = DeviceConfigClient::with_base_uri("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[test]
    fn test_settings_are_mutable() {
        let mut client = client();
        client.set_retry_count(5);
        client.set_retry_delay(Duration::from_millis(50));
        client.set_request_timeout(Duration::from_secs(1));
        assert_eq!(client.retry_count(), 5);
        assert_eq!(client.retry_delay(), Duration::from_millis(50));
        assert_eq!(client.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_resolve_uri() {
        let client = client();
        assert_eq!(
            client.resolve_uri("http://10.0.0.1/cgi-bin/Other.cgi").unwrap(),
            "http://10.0.0.1/cgi-bin/Other.cgi"
        );
        assert_eq!(
            client.resolve_uri("/cgi-bin/Config.cgi?action=dir&property=DCIM").unwrap(),
            "http://192.72.1.1/cgi-bin/Config.cgi?action=dir&property=DCIM"
        );
        assert_eq!(
            client.resolve_uri("?action=get&property=Camera.Preview").unwrap(),
            "http://192.72.1.1/cgi-bin/Config.cgi?action=get&property=Camera.Preview"
        );
        assert_eq!(
            client.resolve_uri("Status.cgi").unwrap(),
            "http://192.72.1.1/cgi-bin/Status.cgi"
        );
    }

    #[test]
    fn test_resolve_uri_keeps_custom_port() {
        let client = DeviceConfigClient::with_transport(
            ClientConfig::builder()
                .base_uri("http://127.0.0.1:8080/cgi-bin/Config.cgi")
                .build(),
            Arc::new(NullTransport),
        )
        .unwrap();
        assert_eq!(
            client.resolve_uri("/cgi-bin/Config.cgi?action=get").unwrap(),
            "http://127.0.0.1:8080/cgi-bin/Config.cgi?action=get"
        );
    }

    #[test]
    fn test_debug_omits_transport() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("base_uri"));
        assert!(!rendered.contains("NullTransport"));
    }

    #[tokio::test]
    async fn test_get_parses_response() {
        let resp = client().get("Camera.Preview").await.unwrap();
        assert_eq!(resp.value, "1");
        assert!(resp.success);
        assert_eq!(resp.property_name.as_deref(), Some("Camera.Preview"));
    }
}
