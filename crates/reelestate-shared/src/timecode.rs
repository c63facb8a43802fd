//! `MM:SS` timecodes used by the upload API for highlight start times.

use crate::error::SharedError;

/// Format whole seconds as `MM:SS`, rounding down. Negative and non-finite
/// inputs format as `00:00`.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `MM:SS` back into seconds.
pub fn parse_mm_ss(s: &str) -> Result<f64, SharedError> {
    let (m, sec) = s
        .trim()
        .split_once(':')
        .ok_or_else(|| SharedError::Timecode(s.to_string()))?;
    let minutes: u64 = m
        .parse()
        .map_err(|_| SharedError::Timecode(s.to_string()))?;
    let seconds: u64 = sec
        .parse()
        .map_err(|_| SharedError::Timecode(s.to_string()))?;
    if seconds >= 60 {
        return Err(SharedError::Timecode(s.to_string()));
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .map(|total| total as f64)
        .ok_or_else(|| SharedError::Timecode(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(12.0), "00:12");
        assert_eq!(format_mm_ss(12.9), "00:12");
        assert_eq!(format_mm_ss(75.0), "01:15");
        assert_eq!(format_mm_ss(-3.0), "00:00");
        assert_eq!(format_mm_ss(f64::NAN), "00:00");
    }

    #[test]
    fn test_parse_mm_ss() {
        assert_eq!(parse_mm_ss("01:15").unwrap(), 75.0);
        assert!(parse_mm_ss("1:75").is_err());
        assert!(parse_mm_ss("abc").is_err());
    }

    #[test]
    fn test_parse_mm_ss_rejects_overflowing_minutes() {
        let huge = "999999999999999999:00";
        assert!(matches!(parse_mm_ss(huge), Err(SharedError::Timecode(s)) if s == huge));
    }
}
