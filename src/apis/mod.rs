//! HTTP clients for the external itinerary services.

pub mod edit;
pub mod generation;

use std::time::Duration;

use tracing::debug;

use crate::error::{ItineraryError, Result};

/// Probe `{base}/health` before a real call. Both services expose the same
/// health endpoint; an unreachable or non-success response maps straight to
/// `UpstreamServiceUnavailable` so the caller never waits out a long
/// generation timeout against a dead service.
pub(crate) async fn check_health(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<()> {
    let url = format!("{base_url}/health");
    let response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|err| ItineraryError::UpstreamServiceUnavailable {
            status: 0,
            message: format!("health check failed: {err}"),
        })?;

    if !response.status().is_success() {
        return Err(ItineraryError::UpstreamServiceUnavailable {
            status: response.status().as_u16(),
            message: "health check returned non-success status".to_string(),
        });
    }

    debug!("Health check passed for {base_url}");
    Ok(())
}
