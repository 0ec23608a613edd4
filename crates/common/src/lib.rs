/// Common types shared by the shorts pipeline crates
use std::time::Duration;
use thiserror::Error;

/// Closed classification of external provider failures.
///
/// Every collaborator adapter maps its native error surface (exit codes,
/// stderr text, HTTP statuses) into exactly one of these variants through an
/// explicit table; callers branch on the variant, never on message contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The requested item (language track, resource) does not exist.
    #[error("not available: {0}")]
    NotAvailable(String),

    /// The capability is switched off for this source; no alternative
    /// request against the same source can succeed.
    #[error("disabled for this source: {0}")]
    Disabled(String),

    /// The provider throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A failure expected to clear on its own (network, 5xx, timeout).
    #[error("transient failure: {0}")]
    Transient(String),

    /// A failure that will not clear without operator intervention.
    #[error("fatal provider error: {0}")]
    Fatal(String),
}

/// Classify an HTTP response into the provider error taxonomy.
///
/// | condition | classification |
/// |---|---|
/// | 429 | `RateLimited` |
/// | 400 or 403 with "quota" in the body | `RateLimited` |
/// | 401, 403 | `Disabled` |
/// | 404 | `NotAvailable` |
/// | 408, 500-504 | `Transient` |
/// | anything else | `Fatal` |
#[must_use]
pub fn classify_http_status(status: u16, body: &str) -> ProviderError {
    let detail = format!("HTTP {status}: {}", excerpt(body));
    let quota = body.to_ascii_lowercase().contains("quota");
    match status {
        429 => ProviderError::RateLimited(detail),
        400 | 403 if quota => ProviderError::RateLimited(detail),
        401 | 403 => ProviderError::Disabled(detail),
        404 => ProviderError::NotAvailable(detail),
        408 | 500..=504 => ProviderError::Transient(detail),
        _ => ProviderError::Fatal(detail),
    }
}

/// First line of a response body, capped for log lines.
fn excerpt(body: &str) -> String {
    body.lines()
        .next()
        .unwrap_or("")
        .trim()
        .chars()
        .take(120)
        .collect()
}

/// Blocking wait used for retry backoff and inter-request pacing.
///
/// The pipeline is single-threaded; sleeping blocks the one execution
/// thread. Tests substitute a recording implementation.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// `std::thread::sleep`-backed clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_statuses() {
        assert!(matches!(
            classify_http_status(429, "slow down"),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            classify_http_status(403, "Quota exceeded for imagen requests"),
            ProviderError::RateLimited(_)
        ));
        assert!(matches!(
            classify_http_status(400, "RESOURCE_EXHAUSTED: quota"),
            ProviderError::RateLimited(_)
        ));
    }

    #[test]
    fn test_auth_statuses_are_disabled() {
        assert!(matches!(
            classify_http_status(401, "invalid key"),
            ProviderError::Disabled(_)
        ));
        assert!(matches!(
            classify_http_status(403, "permission denied"),
            ProviderError::Disabled(_)
        ));
    }

    #[test]
    fn test_missing_and_transient_statuses() {
        assert!(matches!(
            classify_http_status(404, ""),
            ProviderError::NotAvailable(_)
        ));
        assert!(matches!(
            classify_http_status(503, "overloaded"),
            ProviderError::Transient(_)
        ));
        assert!(matches!(
            classify_http_status(408, ""),
            ProviderError::Transient(_)
        ));
    }

    #[test]
    fn test_unexpected_status_is_fatal() {
        assert!(matches!(
            classify_http_status(418, "teapot"),
            ProviderError::Fatal(_)
        ));
    }

    #[test]
    fn test_detail_keeps_first_line_only() {
        let err = classify_http_status(500, "first line\nsecond line");
        assert_eq!(
            err,
            ProviderError::Transient("HTTP 500: first line".to_string())
        );
    }
}
