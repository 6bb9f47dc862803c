use std::time::Duration;

const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// `retry-after` in whole seconds; HTTP-date values are ignored.
pub(super) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Server hint when present (never below the base delay), else doubling backoff.
pub(super) fn retry_delay(
    base_delay_ms: u64,
    attempt: usize,
    retry_after: Option<Duration>,
) -> Duration {
    let base = Duration::from_millis(base_delay_ms);
    match retry_after {
        Some(hint) => hint.max(base),
        None => {
            let doublings = attempt.saturating_sub(1).min(10) as u32;
            let delay_ms = base_delay_ms.saturating_mul(1_u64 << doublings);
            Duration::from_millis(delay_ms.min(MAX_RETRY_DELAY_MS))
        }
    }
}

pub(super) fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Rate limiting and server-side failures; other 4xx are final.
pub(super) fn is_retryable_github_status(status: u16) -> bool {
    matches!(status, 429 | 500..=599)
}

pub(super) fn truncate_for_error(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
