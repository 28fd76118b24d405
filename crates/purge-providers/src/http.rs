use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

const MAX_ATTEMPTS: u32 = 3;
const FALLBACK_WAIT: Duration = Duration::from_secs(1);
const MAX_HEADER_WAIT: Duration = Duration::from_secs(60);

pub async fn send_with_retry<F>(build: F) -> anyhow::Result<Response>
where
    F: FnMut() -> anyhow::Result<RequestBuilder>,
{
    send_with_retry_allow_statuses(build, &[]).await
}

/// Sends the request built by `build`, retrying rate-limited and unavailable
/// responses a bounded number of times. Statuses in `allowed` are handed back
/// to the caller instead of becoming errors.
pub async fn send_with_retry_allow_statuses<F>(
    mut build: F,
    allowed: &[StatusCode],
) -> anyhow::Result<Response>
where
    F: FnMut() -> anyhow::Result<RequestBuilder>,
{
    let mut attempt = 1;
    loop {
        let response = build()?.send().await.context("send request")?;
        let status = response.status();
        if status.is_success() || allowed.contains(&status) {
            return Ok(response);
        }
        if attempt < MAX_ATTEMPTS && is_retryable(status, response.headers()) {
            let delay = retry_wait(response.headers());
            debug!(
                status = status.as_u16(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "request throttled, retrying"
            );
            let _ = response.bytes().await;
            tokio::time::sleep(delay).await;
            attempt += 1;
            continue;
        }
        return Err(match response.error_for_status() {
            Err(err) => err.into(),
            Ok(response) => anyhow!("unexpected response status {}", response.status()),
        });
    }
}

fn is_retryable(status: StatusCode, headers: &HeaderMap) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => true,
        StatusCode::FORBIDDEN => ratelimit_exhausted(headers),
        _ => false,
    }
}

fn ratelimit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim() == "0")
}

fn retry_wait(headers: &HeaderMap) -> Duration {
    retry_delay_from_headers(headers)
        .unwrap_or(FALLBACK_WAIT)
        .min(MAX_HEADER_WAIT)
}

fn retry_delay_from_headers(headers: &HeaderMap) -> Option<Duration> {
    retry_after_seconds(headers)
        .or_else(|| ratelimit_reset_seconds(headers, now_epoch_seconds()))
        .map(Duration::from_secs)
}

fn retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn ratelimit_reset_seconds(headers: &HeaderMap, now: u64) -> Option<u64> {
    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())?;
    reset.checked_sub(now).filter(|wait| *wait > 0)
}

fn now_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
