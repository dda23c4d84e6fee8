//! Retry with exponential backoff and jitter for source fetches.

use std::future::Future;

use anyhow::{anyhow, Result};
use rand::Rng;
use tokio::time::{sleep, Duration};

use crate::logging::{log, obj, v_num, v_str, Domain, Level};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 200,
            max_delay_ms: 5000,
            jitter_factor: 0.3,
        }
    }
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms as f64 * 2.0_f64.powi(attempt as i32);
        let clamped = base.min(self.max_delay_ms as f64);
        let jitter_range = clamped * self.jitter_factor;
        let jitter: f64 = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        Duration::from_millis((clamped + jitter).max(0.0) as u64)
    }
}

/// Retry a fallible async operation, sleeping between attempts.
pub async fn retry_async<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt < config.max_retries {
                    let delay = config.delay_for_attempt(attempt);
                    log(
                        Level::Warn,
                        Domain::Collect,
                        "retry",
                        obj(&[
                            ("operation", v_str(operation_name)),
                            ("attempt", v_num((attempt + 1) as f64)),
                            ("max_attempts", v_num((config.max_retries + 1) as f64)),
                            ("error", v_str(&e.to_string())),
                            ("delay_ms", v_num(delay.as_millis() as f64)),
                        ]),
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("retry exhausted without error")))
}
