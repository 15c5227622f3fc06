//! Configuration types deserialized from `lumen.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;

/// Default bound on context reuse before a rebuild is forced.
pub const DEFAULT_MAX_AST_REUSE_COUNT: u32 = 100;

/// Default minimum interval between dependency fingerprint re-checks.
pub const DEFAULT_DEPENDENCY_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Runtime tuning knobs for the analysis cache.
///
/// `max_ast_reuse_count` bounds how many requests a cached context may serve
/// before a rebuild is forced even with unchanged dependencies, so that
/// incremental drift never silently diverges from a from-scratch analysis.
/// `dependency_check_interval` rate-limits fingerprint re-checks; between
/// checks the cached context is optimistically assumed fresh.
///
/// A reuse count of 0 means "never reuse" and an interval of zero means
/// "re-fingerprint on every request"; both are accepted (they are useful in
/// tests and for debugging cache behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Maximum number of reuses of one built context.
    #[serde(default = "default_reuse_count")]
    pub max_ast_reuse_count: u32,

    /// Minimum elapsed time between dependency fingerprint re-checks.
    #[serde(
        default = "default_check_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub dependency_check_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_ast_reuse_count: DEFAULT_MAX_AST_REUSE_COUNT,
            dependency_check_interval: DEFAULT_DEPENDENCY_CHECK_INTERVAL,
        }
    }
}

fn default_reuse_count() -> u32 {
    DEFAULT_MAX_AST_REUSE_COUNT
}

fn default_check_interval() -> Duration {
    DEFAULT_DEPENDENCY_CHECK_INTERVAL
}

/// Parses a duration string like "5s", "250ms", "2m", or a bare number
/// of milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let err = || format!("invalid duration: '{s}'");

    let lower = s.to_ascii_lowercase();
    if let Some(num) = lower.strip_suffix("ms") {
        let val: u64 = num.trim().parse().map_err(|_| err())?;
        return Ok(Duration::from_millis(val));
    }
    if let Some(num) = lower.strip_suffix('s') {
        let val: f64 = num.trim().parse().map_err(|_| err())?;
        // Rejects negative, non-finite, and overflowing values.
        return Duration::try_from_secs_f64(val).map_err(|_| err());
    }
    if let Some(num) = lower.strip_suffix('m') {
        let val: u64 = num.trim().parse().map_err(|_| err())?;
        let secs = val.checked_mul(60).ok_or_else(err)?;
        return Ok(Duration::from_secs(secs));
    }

    // Bare number — interpreted as milliseconds
    let val: u64 = s.parse().map_err(|_| err())?;
    Ok(Duration::from_millis(val))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration string like \"5s\" or a number of milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            parse_duration(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_millis)
                .map_err(|_| E::custom("duration must be non-negative"))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_ast_reuse_count, DEFAULT_MAX_AST_REUSE_COUNT);
        assert_eq!(
            config.dependency_check_interval,
            DEFAULT_DEPENDENCY_CHECK_INTERVAL
        );
    }

    #[test]
    fn parse_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(
            parse_duration("0.5s").unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn parse_millis() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn parse_minutes() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn parse_bare_number_is_millis() {
        assert_eq!(parse_duration("1500").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(parse_duration("100MS").unwrap(), Duration::from_millis(100));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-3s").is_err());
    }

    #[test]
    fn parse_rejects_overflow_without_panicking() {
        assert!(parse_duration("1e20s").is_err());
        assert!(parse_duration("inf s").is_err());
        assert!(parse_duration("99999999999999999999m").is_err());
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
    }
}
