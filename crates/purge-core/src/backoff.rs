use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Settings for a single [`run`] call: how long to wait after the first
/// failure, how much to grow that wait after every further failure, and the
/// total wall-clock budget measured from the first attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffConfig {
    initial_delay: Duration,
    factor: f64,
    timeout: Duration,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidBackoffConfig {
    #[error("backoff factor must be a finite number greater than zero (got {0})")]
    Factor(f64),
}

/// The operation kept failing until the timeout elapsed. The last operation
/// error is not carried.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("operation timed out after {}ms", .timeout.as_millis())]
pub struct BackoffTimeout {
    pub timeout: Duration,
}

impl BackoffConfig {
    pub fn new(
        initial_delay: Duration,
        factor: f64,
        timeout: Duration,
    ) -> Result<Self, InvalidBackoffConfig> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(InvalidBackoffConfig::Factor(factor));
        }
        Ok(Self {
            initial_delay,
            factor,
            timeout,
        })
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn grow(&self, delay: Duration) -> Duration {
        let nanos = (delay.as_nanos() as f64 * self.factor).round();
        if nanos >= u64::MAX as f64 {
            return Duration::MAX;
        }
        Duration::from_nanos(nanos as u64)
    }
}

/// Runs `operation` until it succeeds or `config.timeout()` has elapsed since
/// the first attempt.
///
/// Failures before the deadline are logged and swallowed; the caller sleeps
/// for the current delay, which is then multiplied by the factor. A success
/// returns immediately without consulting the clock. Each call owns its start
/// instant and delay, so `run` may be nested inside another `run`'s
/// operation.
pub async fn run<T, E, F, Fut>(
    config: &BackoffConfig,
    mut operation: F,
) -> Result<T, BackoffTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    let mut delay = config.initial_delay;
    let mut attempt: u32 = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if start.elapsed() >= config.timeout {
            debug!(attempt, error = %err, "giving up after timeout");
            return Err(BackoffTimeout {
                timeout: config.timeout,
            });
        }
        debug!(
            attempt,
            error = %err,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
        delay = config.grow(delay);
        attempt = attempt.saturating_add(1);
    }
}
