//! Interval flooring and demand bin assignment.

use chrono::{DateTime, Timelike, Utc};

/// Floor a timestamp to the previous `interval_minutes` boundary within the
/// hour: the sub-minute component is zeroed, then `minute % interval` minutes
/// are subtracted. A calendar floor, not a rounding; 12:07 floors to 12:00
/// for a 20-minute interval while 12:20 is already aligned.
///
/// General over any positive interval width; the reference deployment uses
/// 20 minutes.
pub fn floor_to_interval(t: DateTime<Utc>, interval_minutes: u32) -> DateTime<Utc> {
    let interval = interval_minutes.max(1);
    let secs = t.timestamp();
    let minute_start = secs - secs.rem_euclid(60);
    let excess_minutes = i64::from(t.minute() % interval);
    DateTime::from_timestamp(minute_start - excess_minutes * 60, 0).unwrap_or(t)
}

/// The demand bin a flight falls into: whole `interval_minutes` intervals
/// elapsed between `aligned_window_start` and `flight_start`.
///
/// `None` when the flight starts before the aligned window start. That flight
/// is still drawn on the map (its trajectory intersects the window) but must
/// not register demand in a bin preceding the displayed window; the asymmetry
/// is intentional.
pub fn bin_index(
    flight_start: DateTime<Utc>,
    aligned_window_start: DateTime<Utc>,
    interval_minutes: u32,
) -> Option<u32> {
    if flight_start < aligned_window_start {
        return None;
    }
    let elapsed = (flight_start - aligned_window_start).num_seconds();
    let bin_seconds = i64::from(interval_minutes.max(1)) * 60;
    Some((elapsed / bin_seconds) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn floor_aligns_to_twenty_minute_boundaries() {
        assert_eq!(floor_to_interval(at(12, 7), 20), at(12, 0));
        assert_eq!(floor_to_interval(at(12, 20), 20), at(12, 20));
        assert_eq!(floor_to_interval(at(12, 39), 20), at(12, 20));
        assert_eq!(floor_to_interval(at(12, 40), 20), at(12, 40));
    }

    #[test]
    fn floor_zeroes_seconds_first() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 20, 59).unwrap();
        assert_eq!(floor_to_interval(t, 20), at(12, 20));
    }

    #[test]
    fn floor_is_general_over_interval_width() {
        assert_eq!(floor_to_interval(at(12, 44), 15), at(12, 30));
        assert_eq!(floor_to_interval(at(12, 44), 60), at(12, 0));
    }

    #[test]
    fn bin_assignment_respects_window_boundary() {
        let aligned = at(12, 0);
        // Five minutes before the window: no bin at all.
        assert_eq!(bin_index(at(11, 55), aligned, 20), None);
        // Exactly at the boundary: bin 0.
        assert_eq!(bin_index(at(12, 0), aligned, 20), Some(0));
        // 25 minutes in: second bin.
        assert_eq!(bin_index(at(12, 25), aligned, 20), Some(1));
        assert_eq!(bin_index(at(13, 0), aligned, 20), Some(3));
    }
}
