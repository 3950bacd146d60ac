//! Backoff Scheduler
//!
//! Runs a fallible async action up to `max_retries + 1` times, sleeping
//! `base_delay * 2^i` after the i-th failure (i from 0). Sleeps are tokio
//! timers, so waiting never blocks a worker thread and a paused test clock
//! advances through them instantly.
//!
//! [`retry`] returns the last error verbatim. [`retry_with_ctx`] also
//! watches an [`ExecCtx`] and gives up early on cancellation or deadline.

pub mod context;
pub mod errors;
pub mod policy;
pub mod scheduler;

pub use context::ExecCtx;
pub use errors::{InvalidPolicy, RetryError};
pub use policy::RetryPolicy;
pub use scheduler::{retry, retry_with_ctx};
