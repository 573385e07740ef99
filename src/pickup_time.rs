use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PickupTimeError {
    #[error("Please assign a pickup time before booking.")]
    Missing,
    #[error("Please provide a valid pickup time.")]
    Invalid,
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const OFFSET_SUFFIXES: [&str; 3] = ["%:z", "%z", "%#z"];

/// Parse a pickup time typed by a buyer.
///
/// Accepts `YYYY-MM-DD` followed by `T` or a space and `HH:MM[:SS[.frac]]`,
/// optionally suffixed with `Z` or a `±HH[:MM]` offset. Times without an
/// offset are read as wall-clock time in `zone`; a wall-clock time skipped by
/// a DST change is rejected and an ambiguous one resolves to the earlier
/// instant.
pub fn parse_pickup_time(input: &str, zone: Tz) -> Result<DateTime<FixedOffset>, PickupTimeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PickupTimeError::Missing);
    }

    let normalized = match input.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };

    for format in NAIVE_FORMATS {
        for suffix in OFFSET_SUFFIXES {
            if let Ok(aware) = DateTime::parse_from_str(&normalized, &format!("{format}{suffix}")) {
                return Ok(aware);
            }
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .ok_or(PickupTimeError::Invalid)?;

    match zone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
        LocalResult::None => Err(PickupTimeError::Invalid),
    }
}
