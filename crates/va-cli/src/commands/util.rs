//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use va_core::TimePoint;

/// Pre-compiled regex for `[[HH:]MM:]SS[.mmm]` offsets.
static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:(\d+):)?(\d+):)?(\d+)(?:\.(\d{1,3}))?$").expect("offset pattern is valid")
});

/// Parse a video offset.
///
/// Supports:
/// - Seconds: "12", "12.5"
/// - Minutes and seconds: "01:02.250"
/// - Hours, minutes and seconds: "1:02:03.004"
///
/// Components are not range-checked: "90" is a minute and a half. Offsets
/// whose total does not fit in milliseconds are rejected.
pub fn parse_offset(s: &str) -> anyhow::Result<TimePoint> {
    let Some(caps) = OFFSET_RE.captures(s.trim()) else {
        anyhow::bail!("Invalid offset: {s}. Use [[HH:]MM:]SS[.mmm] (e.g., 01:02.250)");
    };

    let component = |idx: usize| -> anyhow::Result<i64> {
        caps.get(idx).map_or(Ok(0), |m| {
            m.as_str()
                .parse()
                .with_context(|| format!("offset component too large in {s}"))
        })
    };
    // ".5" is half a second, not five milliseconds
    let millis = caps
        .get(4)
        .map_or(Ok(0), |m| format!("{:0<3}", m.as_str()).parse::<i64>())
        .context("failed to parse milliseconds")?;

    let total = component(1)?
        .checked_mul(3_600_000)
        .zip(component(2)?.checked_mul(60_000))
        .and_then(|(h, m)| h.checked_add(m))
        .zip(component(3)?.checked_mul(1000))
        .and_then(|(hm, sec)| hm.checked_add(sec))
        .and_then(|total| total.checked_add(millis));
    let Some(total) = total else {
        anyhow::bail!("Offset out of range: {s}. Use [[HH:]MM:]SS[.mmm] (e.g., 01:02.250)");
    };

    Ok(TimePoint::from_millis(total))
}

/// Parse a `NAME=VALUE` pair. An empty value means "not specified".
pub fn parse_pair(s: &str) -> anyhow::Result<(String, Option<String>)> {
    let Some((name, value)) = s.split_once('=') else {
        anyhow::bail!("Invalid pair: {s}. Use NAME=VALUE");
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid pair: {s}. The name is empty");
    }
    let value = Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string);
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_seconds() {
        assert_eq!(parse_offset("12").unwrap().in_milliseconds(), 12_000);
        assert_eq!(parse_offset("12.5").unwrap().in_milliseconds(), 12_500);
        assert_eq!(parse_offset("0.007").unwrap().in_milliseconds(), 7);
    }

    #[test]
    fn test_parse_offset_with_minutes_and_hours() {
        assert_eq!(parse_offset("01:02.250").unwrap().in_milliseconds(), 62_250);
        let tp = parse_offset("1:02:03.004").unwrap();
        assert_eq!(tp.timestamp(), "01:02:03.004");
    }

    #[test]
    fn test_parse_offset_carries_large_components() {
        assert_eq!(parse_offset("90").unwrap().short_timestamp(), "01:30.000");
    }

    #[test]
    fn test_parse_offset_rejects_garbage() {
        for input in ["", "abc", "1:2:3:4", "12.3456", "-5", "1.2.3", "99999999999999999999"] {
            assert!(parse_offset(input).is_err(), "{input:?} should not parse");
        }
    }

    #[test]
    fn test_parse_offset_rejects_overflowing_hours() {
        let err = parse_offset("9999999999999:00:00").unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
        assert!(parse_offset("9999999999999999:00").is_err());

        let long = parse_offset("1000:00:00").unwrap();
        assert_eq!(long.in_milliseconds(), 3_600_000_000);
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("Object=LargeRedBlock1").unwrap(),
            ("Object".to_string(), Some("LargeRedBlock1".to_string()))
        );
        assert_eq!(
            parse_pair("Location=on(Base=1)").unwrap(),
            ("Location".to_string(), Some("on(Base=1)".to_string()))
        );
        assert_eq!(parse_pair("comment=").unwrap(), ("comment".to_string(), None));
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }
}
