//! Low-level request commands

use anyhow::{bail, Result};
use micam_client::{CancellationToken, DeviceConfigClient};

use crate::output::{status_label, OutputContext};

/// Issue a request to an arbitrary endpoint and print the parsed answer
pub async fn request(
    client: &DeviceConfigClient,
    uri: &str,
    cancel: &CancellationToken,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.request_with_cancel(uri, cancel).await?;

    ctx.print_kv(&[
        ("Value", response.value.clone()),
        ("Status", status_label(response.success)),
        ("Property", response.property_name.clone().unwrap_or_default()),
        ("Raw", response.raw_response.clone()),
    ]);

    if !response.success {
        bail!("Device reported an error for {}", uri);
    }
    Ok(())
}

/// Send one attempt and print the unparsed answer
pub async fn raw(
    client: &DeviceConfigClient,
    uri: &str,
    cancel: &CancellationToken,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.raw_request_with_cancel(uri, cancel).await?;

    ctx.print_kv(&[
        ("Status", response.status.to_string()),
        ("Body", response.body),
    ]);
    Ok(())
}
