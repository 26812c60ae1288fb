use std::sync::LazyLock;

const DEFAULT_COOKIE_NAME: &str = "__Host-SessionId";
const DEFAULT_MAX_AGE_SECS: u64 = 600;

/// Longest accepted session lifetime (one year).
const MAX_SESSION_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    parse_cookie_name(std::env::var("SESSION_COOKIE_NAME").ok().as_deref())
});

pub(super) static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    parse_max_age(std::env::var("SESSION_COOKIE_MAX_AGE").ok().as_deref())
});

fn parse_cookie_name(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_COOKIE_NAME)
        .to_string()
}

/// Seconds a session stays valid. Unparsable, zero or out-of-range values use the default.
fn parse_max_age(value: Option<&str>) -> u64 {
    match value.and_then(|s| s.trim().parse::<u64>().ok()) {
        Some(secs) if (1..=MAX_SESSION_MAX_AGE_SECS).contains(&secs) => secs,
        Some(secs) => {
            tracing::warn!(
                "SESSION_COOKIE_MAX_AGE={} out of range, using {}",
                secs,
                DEFAULT_MAX_AGE_SECS
            );
            DEFAULT_MAX_AGE_SECS
        }
        None => DEFAULT_MAX_AGE_SECS,
    }
}
