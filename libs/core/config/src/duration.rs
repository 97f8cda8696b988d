//! Human-friendly durations such as `500ms`, `1m30s` or `1.5h`.

use std::time::Duration;

use crate::ConfigError;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fractional digits past nanosecond precision are dropped.
const MAX_FRACTION_DIGITS: usize = 9;

/// Parse a duration string; a bare number means seconds.
///
/// Segments may be chained (`1h15m`) and may carry a fraction (`1.5h`).
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
pub fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    let malformed = || ConfigError::parse(key, format!("'{}' is not a duration", value));
    let too_large = || ConfigError::parse(key, format!("'{}' is too large", value));

    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = value.parse().map_err(|_| too_large())?;
        return Ok(Duration::from_secs(secs));
    }

    let mut rest = value;
    let mut total: u128 = 0;
    if rest.is_empty() {
        return Err(malformed());
    }

    while !rest.is_empty() {
        let int_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (whole, tail) = rest.split_at(int_end);

        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after_dot) => {
                let frac_end = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(frac_end)
            }
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let unit_nanos = unit_nanos(unit).ok_or_else(|| {
            ConfigError::parse(
                key,
                format!(
                    "unknown duration unit '{}', expected ns, us, ms, s, m or h",
                    unit
                ),
            )
        })?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| too_large())?
        };
        let mut segment = whole.checked_mul(unit_nanos).ok_or_else(too_large)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let scale = 10u128.pow(digits.len() as u32);
            let numerator: u128 = digits.parse().map_err(|_| malformed())?;
            segment = segment
                .checked_add(numerator * unit_nanos / scale)
                .ok_or_else(too_large)?;
        }

        total = total.checked_add(segment).ok_or_else(too_large)?;
        rest = next;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| too_large())?;
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 60 * 60 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(nanos)
}

/// Read a duration from the environment, falling back to `default` when unset
pub fn env_duration(key: &str, default: &str) -> Result<Duration, ConfigError> {
    parse_duration(key, &crate::env_or_default(key, default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("K", "250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("K", "30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("K", "1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("K", "2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("K", "15").unwrap(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("K", "").is_err());
        assert!(parse_duration("K", "m").is_err());
        assert!(parse_duration("K", "5d").is_err());
        let err = parse_duration("SYNC", "soon").unwrap_err();
        assert!(err.to_string().contains("SYNC"));
    }

    #[test]
    fn test_parse_compound_and_fractional() {
        assert_eq!(parse_duration("K", "1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("K", "1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("K", "1h15m").unwrap(), Duration::from_secs(4500));
        assert_eq!(parse_duration("K", ".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("K", "1s500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("K", "250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("K", "10ns").unwrap(), Duration::from_nanos(10));
    }

    #[test]
    fn test_parse_overflow_is_an_error() {
        let err = parse_duration("SYNC", "9999999999999999h").unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(parse_duration("K", "99999999999999999999999999").is_err());
        assert!(parse_duration("K", "340282366920938463463374607431768211455h").is_err());
    }

    #[test]
    fn test_parse_rejects_dangling_parts() {
        assert!(parse_duration("K", "1m30").is_err());
        assert!(parse_duration("K", ".s").is_err());
        assert!(parse_duration("K", "1..5s").is_err());
        assert!(parse_duration("K", "1 m").is_err());
    }

    #[test]
    fn test_env_duration_default() {
        temp_env::with_var_unset("DURATION_VAR", || {
            assert_eq!(
                env_duration("DURATION_VAR", "1m").unwrap(),
                Duration::from_secs(60)
            );
        });
    }
}
