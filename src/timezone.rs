//! Resolves the server's configured timezone name into a UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Get the current UTC offset for a canonical timezone name, e.g. "America/Bogota".
///
/// Returns `None` if `canonical_timezone` is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod timezone_tests {
    use time::UtcOffset;

    use super::get_local_offset;

    #[test]
    fn bogota_is_five_hours_behind_utc() {
        // Colombia does not observe daylight saving time.
        assert_eq!(
            get_local_offset("America/Bogota"),
            Some(UtcOffset::from_hms(-5, 0, 0).unwrap())
        );
    }

    #[test]
    fn unknown_timezone_is_none() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
    }
}
