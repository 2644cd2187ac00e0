use std::time::Duration;

use log::{error, info, warn};

use crate::{utils::error_chain, MailError, Seconds};

/// Number of times to try sending before giving up
pub const MAX_ATTEMPTS: u8 = 3;

/// Pause between failed attempts
pub const RETRY_DELAY: Seconds = Seconds::new(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub delay: Seconds,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

/// Runs `operation` until it succeeds, fails with an error that can't be retried or
/// runs out of attempts. `sleep` is called between attempts.
///
/// The error from the final attempt is returned when every attempt fails.
pub fn retry<T, S, F>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut operation: F,
) -> Result<T, MailError>
where
    S: FnMut(Duration),
    F: FnMut() -> Result<T, MailError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(result) => {
                info!("Attempt {attempt}/{max_attempts} succeeded");
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => {
                error!(
                    "Attempt {attempt}/{max_attempts} failed and can't be retried: {}",
                    error_chain(&e)
                );
                return Err(e);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Attempt {attempt}/{max_attempts} failed, retrying in {}: {}",
                    policy.delay,
                    error_chain(&e)
                );
                sleep(policy.delay.into());
                attempt += 1;
            }
            Err(e) => {
                error!(
                    "Giving up after {max_attempts} attempts: {}",
                    error_chain(&e)
                );
                return Err(e);
            }
        }
    }
}
