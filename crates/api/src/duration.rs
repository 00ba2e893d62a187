//! Duration notation used by Everhour payloads.
//!
//! Upstream speaks integer seconds; humans (and LLM callers) tend to write `"1h 30m"`.
//! This module converts between the two.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d+)h)?\s*(?:(\d+)m)?\s*(?:(\d+)s)?\s*$")
        .expect("duration pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(r#"Invalid time format '{input}'. Use format like "1h 30m 45s", "90m", or "3600s""#)]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Render seconds as `"{h}h {m}m {s}s"`, dropping leading zero units.
///
/// The seconds segment is always present: `0 => "0s"`, `61 => "1m 1s"`.
#[must_use]
pub fn encode(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let rest = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {rest}s")
    } else if minutes > 0 {
        format!("{minutes}m {rest}s")
    } else {
        format!("{rest}s")
    }
}

/// Parse `"<n>h <n>m <n>s"` (each part optional, fixed order) into seconds.
///
/// # Errors
///
/// Returns [`FormatError`] when the text carries no unit at all (including the empty string),
/// contains anything besides the three units, or overflows `u64`.
pub fn decode(text: &str) -> Result<u64, FormatError> {
    let caps = DURATION_PATTERN
        .captures(text)
        .ok_or_else(|| FormatError::new(text))?;

    let mut total: u64 = 0;
    let mut matched_any = false;
    for (group, unit) in [(1, 3600_u64), (2, 60), (3, 1)] {
        let Some(m) = caps.get(group) else {
            continue;
        };
        matched_any = true;
        let value: u64 = m.as_str().parse().map_err(|_| FormatError::new(text))?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| FormatError::new(text))?;
    }

    if matched_any {
        Ok(total)
    } else {
        Err(FormatError::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};

    #[test]
    fn encode_drops_leading_zero_units() {
        assert_eq!(encode(0), "0s");
        assert_eq!(encode(45), "45s");
        assert_eq!(encode(60), "1m 0s");
        assert_eq!(encode(3600), "1h 0m 0s");
        assert_eq!(encode(3661), "1h 1m 1s");
        assert_eq!(encode(90_061), "25h 1m 1s");
    }

    #[test]
    fn decode_accepts_any_subset_of_units() {
        assert_eq!(decode("90m").unwrap(), 5400);
        assert_eq!(decode("3600s").unwrap(), 3600);
        assert_eq!(decode("1h 30m 45s").unwrap(), 5445);
        assert_eq!(decode("1h30m").unwrap(), 5400);
        assert_eq!(decode("  2h  ").unwrap(), 7200);
        assert_eq!(decode("1h 5s").unwrap(), 3605);
    }

    #[test]
    fn decode_rejects_text_without_units() {
        for bad in ["", "   ", "abc", "90", "1.5h", "30m 1h", "1d"] {
            let err = decode(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn decode_rejects_overflow() {
        assert!(decode("99999999999999999999h").is_err());
        assert!(decode("5124095576030432h").is_err());
    }

    #[test]
    fn decode_inverts_encode() {
        let samples = (0..5000_u64)
            .step_by(7)
            .chain([3599, 3600, 3601, 86_399, 86_400, 1_000_000, u64::from(u32::MAX)]);
        for s in samples {
            assert_eq!(decode(&encode(s)).unwrap(), s, "round trip for {s}");
        }
    }
}
