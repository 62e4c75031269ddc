use std::time::{Duration, Instant};

/// Seconds until the rate limit resets
pub const RATE_LIMIT_RESET_HEADER: &str = "X-Contentful-RateLimit-Reset";

/// Wait used when the reset header is missing or unparsable
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Longest retry budget honored; larger timeouts are clamped to it
pub const MAX_RETRY_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Deadline for a retry budget starting at `now`
pub fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout.min(MAX_RETRY_TIMEOUT)).unwrap_or(now)
}

/// How long to wait before retrying a rate-limited request.
///
/// Returns `None` when there is no deadline, or when the wait would end at or
/// after it (including waits too large to add to `now`); the caller then
/// gives up instead of retrying.
pub fn retry_after(
    deadline: Option<Instant>,
    reset_header: Option<&str>,
    default_secs: u64,
    now: Instant,
) -> Option<Duration> {
    let deadline = deadline?;

    let secs = reset_header
        .and_then(|header| header.trim().parse::<u64>().ok())
        .unwrap_or(default_secs);
    let wait = Duration::from_secs(secs);

    now.checked_add(wait)
        .filter(|end| *end < deadline)
        .map(|_| wait)
}
