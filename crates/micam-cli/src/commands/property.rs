//! Property commands - read and write device settings

use anyhow::{bail, Result};
use micam_client::{CancellationToken, DeviceConfigClient};

use crate::output::{OutputContext, PropertyRow};

/// Read one or more properties
///
/// All properties are attempted; the command fails afterwards if any of
/// them could not be read. Cancellation stops immediately.
pub async fn get(
    client: &DeviceConfigClient,
    properties: &[String],
    cancel: &CancellationToken,
    ctx: &OutputContext,
) -> Result<()> {
    let mut rows = Vec::with_capacity(properties.len());
    let mut failed = 0;

    for property in properties {
        match client.get_with_cancel(property, cancel).await {
            Ok(response) => {
                if !response.success {
                    failed += 1;
                }
                rows.push(PropertyRow::from_response(property, &response));
            }
            Err(e) if e.is_cancelled() => return Err(e.into()),
            Err(e) => {
                failed += 1;
                rows.push(PropertyRow::failed(property, &e));
            }
        }
    }

    ctx.print(&rows);

    if failed > 0 {
        bail!("{} of {} properties could not be read", failed, properties.len());
    }
    Ok(())
}

/// Write a property
pub async fn set(
    client: &DeviceConfigClient,
    property: &str,
    value: &str,
    cancel: &CancellationToken,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.set_with_cancel(property, value, cancel).await?;

    if !response.success {
        ctx.warn(&format!("Device response: {:?}", response.raw_response));
        bail!("Device rejected {}={}", property, value);
    }

    ctx.print(&[PropertyRow::from_response(property, &response)]);
    ctx.success(&format!("Set {} to {}", property, response.value));
    Ok(())
}
