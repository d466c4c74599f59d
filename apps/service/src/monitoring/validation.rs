//! Sanity checks for the probe settings.
//!
//! The probe runs forever with whatever it was started with, so anything
//! obviously wrong is rejected before the monitor task is spawned.

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use url::Url;

/// Validate the probe endpoint: an absolute http(s) URL with a host.
pub fn validate_endpoint(target: &str) -> Result<Url> {
    let url = Url::parse(target).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme for HTTP probe: {}", other)),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("Probe URL has no host"));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(url)
}

/// Validate the status code that counts as a successful probe.
pub fn validate_expected_status(status: u16) -> Result<StatusCode> {
    StatusCode::from_u16(status).map_err(|_| anyhow!("{} is not an HTTP status code", status))
}

/// Validate the fixed pause between two probes
pub fn validate_check_interval(interval_seconds: u64) -> Result<()> {
    const MIN_INTERVAL: u64 = 1;
    const MAX_INTERVAL: u64 = 3600; // 1 hour

    if interval_seconds < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} seconds (minimum: {})",
            interval_seconds,
            MIN_INTERVAL
        ));
    }

    if interval_seconds > MAX_INTERVAL {
        return Err(anyhow!(
            "Check interval too long: {} seconds (maximum: {})",
            interval_seconds,
            MAX_INTERVAL
        ));
    }

    Ok(())
}

/// Validate timeout is reasonable
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300; // 5 minutes

    if timeout_seconds < MIN_TIMEOUT {
        return Err(anyhow!(
            "Timeout too short: {} seconds (minimum: {})",
            timeout_seconds,
            MIN_TIMEOUT
        ));
    }

    if timeout_seconds > MAX_TIMEOUT {
        return Err(anyhow!(
            "Timeout too long: {} seconds (maximum: {})",
            timeout_seconds,
            MAX_TIMEOUT
        ));
    }

    Ok(())
}
