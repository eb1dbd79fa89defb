use rand::Rng;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::logging::{log, obj, v_str, Domain, Level};

#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Same delay between every attempt.
    Fixed,
    /// `interval_ms * 2^attempt`, capped, with ±`jitter_factor` noise.
    Exponential { max_delay_ms: u64, jitter_factor: f64 },
}

/// Bounded polling for a dependency that shows up late.
#[derive(Clone, Debug)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
    pub backoff: Backoff,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            interval_ms: 500,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollConfig {
    /// Delay after the given (0-based) failed attempt.
    pub(crate) fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => Duration::from_millis(self.interval_ms),
            Backoff::Exponential {
                max_delay_ms,
                jitter_factor,
            } => {
                let base = self.interval_ms as f64 * 2.0_f64.powi(attempt.min(30) as i32);
                let clamped = base.min(max_delay_ms as f64);

                let jitter_range = clamped * jitter_factor.max(0.0);
                let jitter: f64 = if jitter_range > 0.0 {
                    rand::thread_rng().gen_range(-jitter_range..=jitter_range)
                } else {
                    0.0
                };
                Duration::from_millis((clamped + jitter).max(0.0) as u64)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("{name} still unavailable after {attempts} attempts")]
    Exhausted { name: String, attempts: u32 },
}

/// Probe immediately, then after each delay, until it yields a value or the
/// attempt budget runs out. Dropping the future stops polling.
pub async fn poll_until<F, T>(config: &PollConfig, name: &str, mut probe: F) -> Result<T, PollError>
where
    F: FnMut() -> Option<T>,
{
    let attempts = config.max_attempts.max(1);
    for attempt in 0..attempts {
        if let Some(found) = probe() {
            if attempt > 0 {
                log(
                    Level::Info,
                    Domain::Gallery,
                    "poll_ready",
                    obj(&[("name", v_str(name)), ("attempts", serde_json::json!(attempt + 1))]),
                );
            }
            return Ok(found);
        }
        if attempt + 1 < attempts {
            let delay = config.delay_for_attempt(attempt);
            log(
                Level::Debug,
                Domain::Gallery,
                "poll_wait",
                obj(&[
                    ("name", v_str(name)),
                    ("attempt", serde_json::json!(attempt + 1)),
                    ("delay_ms", serde_json::json!(delay.as_millis() as u64)),
                ]),
            );
            sleep(delay).await;
        }
    }

    log(
        Level::Warn,
        Domain::Gallery,
        "poll_exhausted",
        obj(&[("name", v_str(name)), ("attempts", serde_json::json!(attempts))]),
    );
    Err(PollError::Exhausted {
        name: name.to_string(),
        attempts,
    })
}
