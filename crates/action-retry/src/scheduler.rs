//! Retry loops

use crate::{context::ExecCtx, errors::RetryError, policy::RetryPolicy};
use std::fmt::Display;
use std::future::Future;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

/// Run `action` until it succeeds or `policy` runs out of retries.
///
/// Returns the first success, or the error of the final attempt unchanged.
/// With `max_retries == 0` the action runs exactly once and nothing sleeps.
pub async fn retry<T, E, F, Fut>(mut action: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        match action().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "Action succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= policy.max_retries() {
                    warn!(attempts = policy.attempts(), error = %err, "Retries exhausted");
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Action failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry`] bound to an [`ExecCtx`].
///
/// Attempts and sleeps both race the context's cancellation token and
/// deadline; whichever fires first abandons the loop immediately.
pub async fn retry_with_ctx<T, E, F, Fut>(
    ctx: &ExecCtx,
    mut action: F,
    policy: &RetryPolicy,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        let started = u64::from(attempt) + 1;
        if ctx.is_cancelled() {
            return Err(RetryError::Cancelled {
                attempts: started - 1,
            });
        }
        if ctx.is_timeout() {
            return Err(RetryError::DeadlineExceeded {
                attempts: started - 1,
            });
        }

        let result = tokio::select! {
            biased;
            _ = ctx.cancel_token.cancelled() => {
                debug!(action_id = %ctx.action_id, attempt, "Retry cancelled mid-attempt");
                return Err(RetryError::Cancelled { attempts: started });
            }
            _ = deadline_elapsed(ctx.deadline) => {
                return Err(RetryError::DeadlineExceeded { attempts: started });
            }
            result = action() => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if attempt >= policy.max_retries() {
            warn!(
                action_id = %ctx.action_id,
                attempts = started,
                error = %err,
                "Retries exhausted"
            );
            return Err(RetryError::Exhausted {
                attempts: started,
                last: err,
            });
        }

        let delay = policy.delay_for(attempt);
        debug!(
            action_id = %ctx.action_id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Action failed, retrying"
        );
        tokio::select! {
            biased;
            _ = ctx.cancel_token.cancelled() => {
                return Err(RetryError::Cancelled { attempts: started });
            }
            _ = deadline_elapsed(ctx.deadline) => {
                return Err(RetryError::DeadlineExceeded { attempts: started });
            }
            _ = sleep(delay) => {}
        }
        attempt += 1;
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
