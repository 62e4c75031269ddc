//! Search transport for the Content Delivery API
//!
//! [`Client`] fetches `GET /spaces/{space}/entries` with a forced `include`
//! depth, retries on rate limiting while the caller's time budget allows it,
//! and hands the response to the flattener.

pub mod parameters;
pub mod retry;
pub mod client;

pub use parameters::{parse_pair, SearchParameters};
pub use retry::{
    deadline_after, retry_after, DEFAULT_RETRY_AFTER_SECS, MAX_RETRY_TIMEOUT,
    RATE_LIMIT_RESET_HEADER,
};
pub use client::{Client, ClientConfig, CDN_URL, PREVIEW_URL};
