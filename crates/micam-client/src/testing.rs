//! Test utilities for micam-client
//!
//! Provides an in-process fake dashcam serving the Config.cgi protocol.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::{ClientConfig, DeviceConfigClient, Result};

/// Property store and fault injection shared with the server task
#[derive(Default)]
struct DeviceState {
    properties: Mutex<HashMap<String, String>>,
    requests: AtomicU32,
    failures_left: AtomicU32,
}

/// A fake device that automatically shuts down when dropped
///
/// Answers `GET /cgi-bin/Config.cgi?action=get|set&property=..[&value=..]`
/// the way the firmware does. Unknown properties answer `\nerror`.
pub struct TestDevice {
    pub addr: SocketAddr,
    pub client: DeviceConfigClient,
    state: Arc<DeviceState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestDevice {
    /// Start a fake device with a short retry delay
    ///
    /// # Example
    ///
    /// ```ignore
    /// use micam_client::testing::TestDevice;
    ///
    /// let device = TestDevice::start().await?;
    /// device.set_property("Camera.Menu.VideoRes", "1080P30fps");
    ///
    /// let resp = device.client.get("Camera.Menu.VideoRes").await?;
    /// assert!(resp.success);
    /// ```
    pub async fn start() -> Result<Self> {
        Self::start_with_retry(3, Duration::from_millis(10), Duration::from_secs(2)).await
    }

    /// Start a fake device with custom client retry settings
    pub async fn start_with_retry(
        retry_count: u32,
        retry_delay: Duration,
        request_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(DeviceState::default());
        let router = Router::new()
            .route("/cgi-bin/Config.cgi", get(config_cgi))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let config = ClientConfig::builder()
            .base_uri(format!("http://{}/cgi-bin/Config.cgi", addr))
            .retry_count(retry_count)
            .retry_delay(retry_delay)
            .request_timeout(request_timeout)
            .build();
        let client = DeviceConfigClient::from_config(config)?;

        Ok(Self {
            addr,
            client,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the Config.cgi URI of the fake device
    pub fn base_uri(&self) -> String {
        format!("http://{}/cgi-bin/Config.cgi", self.addr)
    }

    /// Seed or overwrite a property
    pub fn set_property(&self, name: impl Into<String>, value: impl Into<String>) {
        self.state.properties.lock().insert(name.into(), value.into());
    }

    /// Current value of a property
    pub fn property(&self, name: &str) -> Option<String> {
        self.state.properties.lock().get(name).cloned()
    }

    /// Answer the next `count` requests with HTTP 503
    pub fn fail_next(&self, count: u32) {
        self.state.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of HTTP requests received so far
    pub fn request_count(&self) -> u32 {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestDevice {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn config_cgi(
    State(state): State<Arc<DeviceState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let injected = state
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if injected {
        return (StatusCode::SERVICE_UNAVAILABLE, String::new());
    }

    let (Some(action), Some(property)) = (params.get("action"), params.get("property")) else {
        return (StatusCode::BAD_REQUEST, String::new());
    };

    let mut properties = state.properties.lock();
    let body = match action.as_str() {
        "get" => match properties.get(property) {
            Some(value) => device_ok(property, value),
            None => "\nerror".to_string(),
        },
        "set" => match (properties.get_mut(property), params.get("value")) {
            (Some(slot), Some(value)) => {
                *slot = value.clone();
                device_ok(property, value)
            }
            _ => "\nerror".to_string(),
        },
        _ => return (StatusCode::BAD_REQUEST, String::new()),
    };

    (StatusCode::OK, body)
}

fn device_ok(property: &str, value: &str) -> String {
    format!("{}\nok\n{}={}\n", value, property, value)
}
