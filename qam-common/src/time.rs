//! Reference timestamp supplied by the browser client
//!
//! The classify endpoint receives the caller's local time as a display string
//! in the form `YYYY年M月D日 H時m分s秒` (numbers may or may not be zero padded).
//! Only the hour is used, to pick the greeting substituted into answers.

use crate::{Error, Result};
use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// chrono format matching `2017年3月8日 18時5分3秒`
const REFERENCE_FORMAT: &str = "%Y年%m月%d日 %H時%M分%S秒";

/// Parsed caller-local timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime(NaiveDateTime);

impl ReferenceTime {
    /// Parse the `YYYY年M月D日 H時m分s秒` display format
    pub fn parse(text: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(text.trim(), REFERENCE_FORMAT)
            .map(Self)
            .map_err(|e| Error::InvalidInput(format!("Invalid timestamp '{}': {}", text, e)))
    }

    /// Hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }
}

impl FromStr for ReferenceTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for ReferenceTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Unpadded, as the browser client renders it
        let t = self.0;
        write!(
            f,
            "{}年{}月{}日 {}時{}分{}秒",
            chrono::Datelike::year(&t),
            chrono::Datelike::month(&t),
            chrono::Datelike::day(&t),
            t.hour(),
            t.minute(),
            t.second()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unpadded() {
        let t = ReferenceTime::parse("2017年3月8日 18時5分3秒").unwrap();
        assert_eq!(t.hour(), 18);
    }

    #[test]
    fn test_parse_zero_padded() {
        let t = ReferenceTime::parse("2017年03月08日 08時05分03秒").unwrap();
        assert_eq!(t.hour(), 8);
    }

    #[test]
    fn test_parse_midnight_hour() {
        let t: ReferenceTime = "2020年12月31日 0時0分0秒".parse().unwrap();
        assert_eq!(t.hour(), 0);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let t = ReferenceTime::parse("  2017年3月8日 3時0分0秒\n").unwrap();
        assert_eq!(t.hour(), 3);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(ReferenceTime::parse("2017-03-08 18:05:03").is_err());
        assert!(ReferenceTime::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        let err = ReferenceTime::parse("2017年2月30日 1時0分0秒").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_display_is_unpadded() {
        let t = ReferenceTime::parse("2017年03月08日 08時05分03秒").unwrap();
        assert_eq!(t.to_string(), "2017年3月8日 8時5分3秒");
    }
}
