use time::OffsetDateTime;
use time_tz::{Offset, TimeZone, Tz};

/// Look up a canonical timezone by name, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known canonical timezone.
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// Convert `datetime` to the wall clock time in `timezone` at that instant.
///
/// The offset is looked up for `datetime` itself, so times on either side of a
/// daylight saving change get their own offsets.
pub fn to_local_time(datetime: OffsetDateTime, timezone: &Tz) -> OffsetDateTime {
    datetime.to_offset(timezone.get_offset_utc(&datetime).to_utc())
}
