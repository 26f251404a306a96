//! Time-of-day handling for timetable queries.
//!
//! Timetables schedule departures as clock times within a single service
//! day, so the engine works in whole seconds since midnight. Queries never
//! plan across midnight: any addition that would land in the next day
//! yields `None` and the caller treats that move as unavailable.

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Seconds in a service day.
pub const SECS_PER_DAY: u32 = 86_400;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// An instant within a single service day.
///
/// Stored as whole seconds since midnight, so ordering and differences are
/// plain integer operations.
///
/// # Examples
///
/// ```
/// use metro_server::domain::TimeOfDay;
///
/// let t = TimeOfDay::parse("08:03").unwrap();
/// assert_eq!(t.secs(), 8 * 3600 + 3 * 60);
/// assert_eq!(t.to_string(), "08:03:00");
///
/// // Seconds are accepted too
/// let t = TimeOfDay::parse("08:13:45").unwrap();
/// assert_eq!(t.second(), 45);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    secs: u32,
}

impl TimeOfDay {
    /// Build from a raw second count. `None` at or past midnight.
    pub fn from_secs(secs: u32) -> Option<Self> {
        if secs < SECS_PER_DAY {
            Some(Self { secs })
        } else {
            None
        }
    }

    /// Build from clock components. `None` if any component is out of range.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            secs: hour * 3600 + minute * 60 + second,
        })
    }

    /// Parse a time from `"HH:MM"` or `"HH:MM:SS"` format.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_server::domain::TimeOfDay;
    ///
    /// assert!(TimeOfDay::parse("00:00").is_ok());
    /// assert!(TimeOfDay::parse("23:59:59").is_ok());
    ///
    /// assert!(TimeOfDay::parse("830").is_err());
    /// assert!(TimeOfDay::parse("24:00").is_err());
    /// assert!(TimeOfDay::parse("08:60").is_err());
    /// assert!(TimeOfDay::parse("08:00:60").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let bytes = s.as_bytes();

        if bytes.len() != 5 && bytes.len() != 8 {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
        }
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = if bytes.len() == 8 {
            if bytes[5] != b':' {
                return Err(TimeError::new("expected colon at position 5"));
            }
            let second = parse_two_digits(&bytes[6..8])
                .ok_or_else(|| TimeError::new("invalid second digits"))?;
            if second > 59 {
                return Err(TimeError::new("second must be 0-59"));
            }
            second
        } else {
            0
        };

        Ok(Self {
            secs: hour * 3600 + minute * 60 + second,
        })
    }

    /// Convert from a wall-clock time, discarding sub-second precision.
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            secs: time.num_seconds_from_midnight().min(SECS_PER_DAY - 1),
        }
    }

    /// Seconds since midnight.
    pub fn secs(&self) -> u32 {
        self.secs
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.secs / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.secs / 60) % 60
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.secs % 60
    }

    /// Advance by `secs` seconds. `None` if the result would cross midnight.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_server::domain::TimeOfDay;
    ///
    /// let t = TimeOfDay::parse("23:30").unwrap();
    /// assert_eq!(t.plus_secs(600).unwrap().to_string(), "23:40:00");
    /// assert_eq!(t.plus_secs(3600), None);
    /// ```
    pub fn plus_secs(&self, secs: u32) -> Option<Self> {
        Self::from_secs(self.secs.checked_add(secs)?)
    }

    /// Signed duration from `earlier` to `self`.
    pub fn signed_duration_since(&self, earlier: Self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.secs) - i64::from(earlier.secs))
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl serde::Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = TimeOfDay::parse("00:00").unwrap();
        assert_eq!(t.hour(), 0);
        assert_eq!(t.minute(), 0);
        assert_eq!(t.second(), 0);

        let t = TimeOfDay::parse("23:59").unwrap();
        assert_eq!(t.hour(), 23);
        assert_eq!(t.minute(), 59);

        let t = TimeOfDay::parse("08:13:45").unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 13);
        assert_eq!(t.second(), 45);
    }

    #[test]
    fn parse_invalid_format() {
        // Wrong length
        assert!(TimeOfDay::parse("830").is_err());
        assert!(TimeOfDay::parse("8:30").is_err());
        assert!(TimeOfDay::parse("08:300").is_err());

        // Missing colons
        assert!(TimeOfDay::parse("08-30").is_err());
        assert!(TimeOfDay::parse("08:30.15").is_err());

        // Non-digit characters
        assert!(TimeOfDay::parse("ab:cd").is_err());
        assert!(TimeOfDay::parse("0a:30").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("99:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("12:00:60").is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(TimeOfDay::parse("00:00").unwrap().to_string(), "00:00:00");
        assert_eq!(TimeOfDay::parse("09:05").unwrap().to_string(), "09:05:00");
        assert_eq!(
            TimeOfDay::parse("23:59:59").unwrap().to_string(),
            "23:59:59"
        );
    }

    #[test]
    fn from_secs_bounds() {
        assert!(TimeOfDay::from_secs(0).is_some());
        assert!(TimeOfDay::from_secs(SECS_PER_DAY - 1).is_some());
        assert!(TimeOfDay::from_secs(SECS_PER_DAY).is_none());
    }

    #[test]
    fn from_hms_bounds() {
        assert!(TimeOfDay::from_hms(23, 59, 59).is_some());
        assert!(TimeOfDay::from_hms(24, 0, 0).is_none());
        assert!(TimeOfDay::from_hms(0, 60, 0).is_none());
        assert!(TimeOfDay::from_hms(0, 0, 60).is_none());
    }

    #[test]
    fn plus_secs_stops_at_midnight() {
        let t = TimeOfDay::parse("23:59:00").unwrap();
        assert_eq!(t.plus_secs(59).unwrap().to_string(), "23:59:59");
        assert_eq!(t.plus_secs(60), None);
        assert_eq!(t.plus_secs(u32::MAX), None);
    }

    #[test]
    fn ordering_follows_clock() {
        let t1 = TimeOfDay::parse("08:00").unwrap();
        let t2 = TimeOfDay::parse("08:00:01").unwrap();
        let t3 = TimeOfDay::parse("09:00").unwrap();
        assert!(t1 < t2);
        assert!(t2 < t3);
    }

    #[test]
    fn duration_since_is_signed() {
        let early = TimeOfDay::parse("08:00").unwrap();
        let late = TimeOfDay::parse("08:10").unwrap();
        assert_eq!(late.signed_duration_since(early).num_seconds(), 600);
        assert_eq!(early.signed_duration_since(late).num_seconds(), -600);
    }

    #[test]
    fn serde_uses_clock_strings() {
        let t = TimeOfDay::parse("08:13:45").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"08:13:45\"");
        let back: TimeOfDay = serde_json::from_str("\"08:13:45\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..24, minute in 0u32..60, second in 0u32..60) -> String {
            format!("{:02}:{:02}:{:02}", hour, minute, second)
        }
    }

    proptest! {
        /// Any valid HH:MM:SS string parses successfully
        #[test]
        fn valid_hhmmss_parses(s in valid_time()) {
            prop_assert!(TimeOfDay::parse(&s).is_ok());
        }

        /// Parse then display roundtrips
        #[test]
        fn parse_display_roundtrip(s in valid_time()) {
            let parsed = TimeOfDay::parse(&s).unwrap();
            prop_assert_eq!(parsed.to_string(), s);
        }

        /// Ordering agrees with the raw second count
        #[test]
        fn ordering_matches_secs(a in 0u32..SECS_PER_DAY, b in 0u32..SECS_PER_DAY) {
            let ta = TimeOfDay::from_secs(a).unwrap();
            let tb = TimeOfDay::from_secs(b).unwrap();
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }

        /// Component accessors reassemble to the original second count
        #[test]
        fn components_reassemble(secs in 0u32..SECS_PER_DAY) {
            let t = TimeOfDay::from_secs(secs).unwrap();
            prop_assert_eq!(t.hour() * 3600 + t.minute() * 60 + t.second(), secs);
        }
    }
}
