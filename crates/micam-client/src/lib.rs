//! MiCam Client Library
//!
//! Talks to the dashcam's embedded HTTP control server (`/cgi-bin/Config.cgi`).
//!
//! # Example
//!
//! ```rust,no_run
//! use micam_client::DeviceConfigClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DeviceConfigClient::new()?;
//!
//!     // Read a property
//!     let res = client.get("Camera.Menu.VideoRes").await?;
//!     println!("{} (ok: {})", res.value, res.success);
//!
//!     // Write a property
//!     client.set("Camera.Menu.EV", "EVP033").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Protocol
//!
//! Requests are plain GETs: `Config.cgi?action=get&property=<name>` and
//! `Config.cgi?action=set&property=<name>&value=<value>`. The client builds
//! the query by plain interpolation and never percent-encodes it itself.
//! [`HttpTransport`] hands the string to reqwest, which parses it as a URL
//! before sending: characters such as spaces are escaped on the wire
//! (`my cam` arrives as `my%20cam`) and anything after a `#` is treated as
//! a fragment and dropped.
//!
//! The device answers with up to three lines: the value, `ok` or an error
//! token, and optionally `<name>=<value>`. See [`DeviceResponse::parse`].
//!
//! # Retries and Cancellation
//!
//! Every request is attempted up to `retry_count` times with `retry_delay`
//! between failed attempts. The `*_with_cancel` variants accept a
//! [`CancellationToken`] that aborts both the HTTP call and the retry wait.
//!
//! # Testing
//!
//! The `testing` module provides a fake device for integration tests:
//!
//! ```rust,ignore
//! use micam_client::testing::TestDevice;
//!
//! let device = TestDevice::start().await?;
//! device.set_property("Camera.Preview", "1");
//! let res = device.client.get("Camera.Preview").await?;
//! ```

mod client;
pub mod config;
mod error;
mod request;
mod response;
pub mod testing;
mod transport;

pub use client::DeviceConfigClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorKind, MiCamClientError, Result, TransportError};
pub use request::{Action, RequestSpec};
pub use response::DeviceResponse;
pub use transport::{HttpTransport, Transport, TransportResponse};

pub use tokio_util::sync::CancellationToken;
