use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `mm:ss` for a countdown.
#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Short human label for an elapsed duration, e.g. `4m 05s`.
#[must_use]
pub fn format_elapsed(secs: u64) -> String {
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s:02}s"),
        (h, m, _) => format!("{h}h {m:02}m"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_pads_minutes_and_seconds() {
        assert_eq!(format_countdown(30), "00:30");
        assert_eq!(format_countdown(5), "00:05");
        assert_eq!(format_countdown(600), "10:00");
    }

    #[test]
    fn elapsed_picks_coarsest_units() {
        assert_eq!(format_elapsed(9), "9s");
        assert_eq!(format_elapsed(245), "4m 05s");
        assert_eq!(format_elapsed(3_780), "1h 03m");
    }

    #[test]
    fn datetime_is_minute_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 7, 59).unwrap();
        assert_eq!(format_datetime(at), "2024-03-09 14:07 UTC");
    }
}
