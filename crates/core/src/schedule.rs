//! Session clock parsing and the connection-info visibility gate.
//!
//! Session times are stored as wall-clock strings in 12-hour form
//! (`"6:30 PM"`). They carry no timezone; [`WallClock`] pins the offset the
//! operators write them in so "now" can be compared against them.
//!
//! The gate is a read-time transform: it never touches stored data and is a
//! pure function of `(session, now)`, so every listing that applies it
//! agrees with every other.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

use crate::batch::BatchMode;

/// How long before the start an ONLINE session's link is disclosed.
pub const LINK_REVEAL_LEAD_MINUTES: i64 = 60;

/// Replaces the meeting link in session listings while it is still hidden.
pub const LINK_PLACEHOLDER: &str = "Link will be shared soon";

/// Replaces the meeting link in the "today's class" view while it is still hidden.
pub const TODAY_LINK_PLACEHOLDER: &str = "Link will be shared soon (1 hour before class)";

// ---------------------------------------------------------------------------
// Clock parsing
// ---------------------------------------------------------------------------

/// Parse a 12-hour clock string such as `"9:05 AM"` or `"12:30pm"`.
///
/// `12:xx AM` is hour 0 and `12:xx PM` is hour 12.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, String> {
    let invalid = || format!("Invalid time '{value}'. Expected h:mm AM or h:mm PM");

    let upper = value.trim().to_ascii_uppercase();
    let (clock, is_pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), true)
    } else {
        return Err(invalid());
    };

    let (hour_str, minute_str) = clock.split_once(':').ok_or_else(invalid)?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hour_str)
        || hour_str.len() > 2
        || !all_digits(minute_str)
        || minute_str.len() != 2
    {
        return Err(invalid());
    }
    let hour: u32 = hour_str.parse().map_err(|_| invalid())?;
    let minute: u32 = minute_str.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let hour24 = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0).ok_or_else(invalid)
}

/// Validate a session's start/end pair. The end must fall after the start.
pub fn validate_session_times(start_time: &str, end_time: &str) -> Result<(), String> {
    let start = parse_clock_time(start_time)?;
    let end = parse_clock_time(end_time)?;
    if end <= start {
        return Err(format!(
            "Session end time '{end_time}' must be after start time '{start_time}'"
        ));
    }
    Ok(())
}

/// Combine a session date with its start-time string.
pub fn session_start(date: NaiveDate, start_time: &str) -> Result<NaiveDateTime, String> {
    Ok(date.and_time(parse_clock_time(start_time)?))
}

/// The instant an ONLINE session's link becomes visible.
pub fn link_reveal_at(date: NaiveDate, start_time: &str) -> Result<NaiveDateTime, String> {
    Ok(session_start(date, start_time)? - Duration::minutes(LINK_REVEAL_LEAD_MINUTES))
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Whether a session's connection info may be shown at wall-clock `now`.
///
/// OFFLINE sessions are never gated. ONLINE sessions are visible from the
/// reveal instant onwards. An unparseable stored start time keeps the link
/// hidden.
pub fn is_connection_info_visible(
    mode: BatchMode,
    date: NaiveDate,
    start_time: &str,
    now: NaiveDateTime,
) -> bool {
    match mode {
        BatchMode::Offline => true,
        BatchMode::Online => match link_reveal_at(date, start_time) {
            Ok(reveal_at) => now >= reveal_at,
            Err(_) => false,
        },
    }
}

/// Apply the gate, returning either the stored value or `placeholder`.
pub fn gate_connection_info(
    mode: BatchMode,
    date: NaiveDate,
    start_time: &str,
    connection_info: Option<&str>,
    now: NaiveDateTime,
    placeholder: &str,
) -> Option<String> {
    if is_connection_info_visible(mode, date, start_time, now) {
        connection_info.map(str::to_string)
    } else {
        Some(placeholder.to_string())
    }
}

// ---------------------------------------------------------------------------
// Wall clock
// ---------------------------------------------------------------------------

/// Fixed UTC offset that session date/time strings are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    offset: FixedOffset,
}

impl WallClock {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Build from an offset in minutes east of UTC (e.g. `330` for +05:30).
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, String> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| format!("Invalid UTC offset: {minutes} minutes"))
    }

    /// Wall-clock reading of a UTC instant.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    pub fn today(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32, s: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, s).unwrap()
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn twelve_am_is_midnight() {
        assert_eq!(parse_clock_time("12:00 AM").unwrap(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse_clock_time("12:45 AM").unwrap(), NaiveTime::from_hms_opt(0, 45, 0).unwrap());
    }

    #[test]
    fn twelve_pm_is_noon() {
        assert_eq!(parse_clock_time("12:00 PM").unwrap(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_clock_time("12:30 PM").unwrap(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
    }

    #[test]
    fn pm_hours_shift_by_twelve() {
        assert_eq!(parse_clock_time("6:30 PM").unwrap(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(parse_clock_time("11:59 PM").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn am_hours_are_unchanged() {
        assert_eq!(parse_clock_time("9:05 AM").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    }

    #[test]
    fn suffix_spacing_and_case_are_tolerated() {
        assert_eq!(parse_clock_time("10:00am").unwrap(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(parse_clock_time("  7:15 pm ").unwrap(), NaiveTime::from_hms_opt(19, 15, 0).unwrap());
    }

    #[test]
    fn malformed_times_are_rejected() {
        for bad in ["", "10:00", "13:00 PM", "0:30 AM", "10:60 AM", "10:5 AM", "ten AM", "10-00 AM"] {
            assert!(parse_clock_time(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn signed_or_padded_numbers_are_rejected() {
        for bad in ["+1:00 PM", "-1:00 PM", "1:+5 PM", "+10:00 AM", "010:00 AM", " 1 :00 PM"] {
            assert!(parse_clock_time(bad).is_err(), "{bad:?} should be rejected");
        }
        assert!(validate_session_times("+1:00 PM", "2:00 PM").is_err());
    }

    #[test]
    fn end_must_follow_start() {
        assert!(validate_session_times("10:00 AM", "11:30 AM").is_ok());
        assert!(validate_session_times("11:00 AM", "12:00 PM").is_ok());
        assert!(validate_session_times("11:00 AM", "11:00 AM").is_err());
        assert!(validate_session_times("1:00 PM", "12:30 PM").is_err());
        assert!(validate_session_times("1:00 PM", "later").is_err());
    }

    // -----------------------------------------------------------------------
    // Gate
    // -----------------------------------------------------------------------

    #[test]
    fn online_link_hidden_before_cutoff() {
        let d = date(2026, 3, 10);
        // Starts 6:00 PM, cutoff 5:00 PM.
        let now = at(d, 16, 59, 59);
        let shown = gate_connection_info(
            BatchMode::Online, d, "6:00 PM", Some("https://meet/abc"), now, LINK_PLACEHOLDER,
        );
        assert_eq!(shown.as_deref(), Some(LINK_PLACEHOLDER));
    }

    #[test]
    fn online_link_visible_exactly_at_cutoff() {
        let d = date(2026, 3, 10);
        let cutoff = link_reveal_at(d, "6:00 PM").unwrap();
        assert_eq!(cutoff, at(d, 17, 0, 0));
        assert!(is_connection_info_visible(BatchMode::Online, d, "6:00 PM", cutoff));
        assert!(is_connection_info_visible(
            BatchMode::Online, d, "6:00 PM", cutoff + Duration::seconds(1)
        ));
        assert!(!is_connection_info_visible(
            BatchMode::Online, d, "6:00 PM", cutoff - Duration::seconds(1)
        ));
    }

    #[test]
    fn midnight_session_cutoff_falls_on_previous_day() {
        let d = date(2026, 3, 10);
        let cutoff = link_reveal_at(d, "12:30 AM").unwrap();
        assert_eq!(cutoff, at(date(2026, 3, 9), 23, 30, 0));
    }

    #[test]
    fn noon_session_cutoff_is_eleven() {
        let d = date(2026, 3, 10);
        assert_eq!(link_reveal_at(d, "12:15 PM").unwrap(), at(d, 11, 15, 0));
    }

    #[test]
    fn offline_location_never_gated() {
        let d = date(2026, 3, 10);
        let long_before = at(date(2025, 1, 1), 0, 0, 0);
        let shown = gate_connection_info(
            BatchMode::Offline, d, "6:00 PM", Some("Hall 2"), long_before, LINK_PLACEHOLDER,
        );
        assert_eq!(shown.as_deref(), Some("Hall 2"));
    }

    #[test]
    fn hidden_link_without_value_still_shows_placeholder() {
        let d = date(2026, 3, 10);
        let shown = gate_connection_info(
            BatchMode::Online, d, "6:00 PM", None, at(d, 8, 0, 0), TODAY_LINK_PLACEHOLDER,
        );
        assert_eq!(shown.as_deref(), Some(TODAY_LINK_PLACEHOLDER));
    }

    #[test]
    fn visible_missing_link_stays_missing() {
        let d = date(2026, 3, 10);
        let shown = gate_connection_info(
            BatchMode::Online, d, "6:00 PM", None, at(d, 17, 30, 0), LINK_PLACEHOLDER,
        );
        assert_eq!(shown, None);
    }

    #[test]
    fn unparseable_start_keeps_link_hidden() {
        let d = date(2026, 3, 10);
        assert!(!is_connection_info_visible(BatchMode::Online, d, "18:00", at(d, 23, 0, 0)));
    }

    #[test]
    fn gate_is_pure() {
        let d = date(2026, 3, 10);
        let now = at(d, 16, 0, 0);
        let first = gate_connection_info(BatchMode::Online, d, "6:00 PM", Some("x"), now, LINK_PLACEHOLDER);
        let second = gate_connection_info(BatchMode::Online, d, "6:00 PM", Some("x"), now, LINK_PLACEHOLDER);
        assert_eq!(first, second);
    }

    // -----------------------------------------------------------------------
    // Wall clock
    // -----------------------------------------------------------------------

    #[test]
    fn wall_clock_applies_offset() {
        let clock = WallClock::from_offset_minutes(330).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(clock.local(instant), at(date(2026, 3, 11), 1, 30, 0));
        assert_eq!(clock.today(instant), date(2026, 3, 11));
    }

    #[test]
    fn wall_clock_rejects_absurd_offsets() {
        assert!(WallClock::from_offset_minutes(24 * 60).is_err());
        assert!(WallClock::from_offset_minutes(-300).is_ok());
    }
}
