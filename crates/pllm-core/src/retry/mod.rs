//! Retry and backoff policy.
//!
//! Worker attempts are not classified: any failed attempt is retryable until
//! the retry budget is spent. The dispatcher asks the policy what to do after
//! each failure so the backoff law lives in one place.

mod policy;

pub use policy::{RetryDecision, RetryPolicy};
