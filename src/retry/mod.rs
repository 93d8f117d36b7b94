//! Retry handling: failure classification and jittered exponential backoff

pub mod policy;


pub use policy::{ErrorKind, RetryPolicy, parse_retry_after};
