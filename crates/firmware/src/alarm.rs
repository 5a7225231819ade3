//! Next-alarm computation
//!
//! The alarm is configured in local time; the RTC keeps UTC. The local
//! offset is a fixed number of seconds east of UTC supplied by time sync.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use platform::AlarmRegisters;

use crate::config::AlarmRecord;

const SECONDS_PER_DAY: i64 = 86_400;

fn offset(utc_offset_s: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_s).unwrap_or_else(|| Utc.fix())
}

/// Unix time of the next ring strictly after `now`, `None` if the alarm is
/// disabled or `now` is out of calendar range.
///
/// Today at `hour:minute` is tried first. If that has passed or today is
/// not a selected weekday, later days are tried one at a time, wrapping
/// Saturday to Sunday, up to the same weekday next week.
pub fn next_alarm(record: &AlarmRecord, now: i64, utc_offset_s: i32) -> Option<i64> {
    if !record.enabled {
        return None;
    }
    let local = DateTime::from_timestamp(now, 0)?.with_timezone(&offset(utc_offset_s));
    let today = local
        .with_hour(u32::from(record.hour))?
        .with_minute(u32::from(record.minute))?
        .with_second(0)?;

    let mut at = today.timestamp();
    let mut weekday = today.weekday().num_days_from_sunday();
    if at > now && record.rings_on(weekday) {
        return Some(at);
    }
    for _ in 0..7 {
        at = at.checked_add(SECONDS_PER_DAY)?;
        weekday = weekday.saturating_add(1).checked_rem(7).unwrap_or(0);
        if record.rings_on(weekday) {
            return Some(at);
        }
    }
    Some(at)
}

/// Local weekday of `at`, 0 = Sunday.
pub fn local_weekday(at: i64, utc_offset_s: i32) -> Option<u8> {
    let local = DateTime::from_timestamp(at, 0)?.with_timezone(&offset(utc_offset_s));
    u8::try_from(local.weekday().num_days_from_sunday()).ok()
}

/// Local (year, day of year) of `at`.
pub fn local_day(at: i64, utc_offset_s: i32) -> Option<(i32, u32)> {
    let local = DateTime::from_timestamp(at, 0)?.with_timezone(&offset(utc_offset_s));
    Some((local.year(), local.ordinal()))
}

/// Local (hour, minute) of `at`, for the watch face.
pub fn local_time(at: i64, utc_offset_s: i32) -> Option<(u8, u8)> {
    let local = DateTime::from_timestamp(at, 0)?.with_timezone(&offset(utc_offset_s));
    Some((
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
    ))
}

/// RTC match registers for a ring at `at`: UTC day of month, hour and
/// minute. Day of month rather than weekday keeps a once-a-week alarm set
/// for "now" from ringing immediately.
pub fn alarm_registers(at: i64) -> Option<AlarmRegisters> {
    let utc = DateTime::from_timestamp(at, 0)?;
    Some(AlarmRegisters {
        hour: u8::try_from(utc.hour()).ok()?,
        minute: u8::try_from(utc.minute()).ok()?,
        day: u8::try_from(utc.day()).ok()?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

    use super::*;

    // 2024-01-03 10:00:00 UTC, a Wednesday.
    const WED_10H: i64 = 1_704_276_000;
    const HOUR: i64 = 3_600;

    fn alarm(hour: u8, minute: u8, days: [bool; 7]) -> AlarmRecord {
        AlarmRecord {
            enabled: true,
            hour,
            minute,
            week_days: days,
        }
    }

    const EVERY_DAY: [bool; 7] = [false; 7];

    #[test]
    fn test_disabled_alarm_never_rings() {
        let mut a = alarm(11, 0, EVERY_DAY);
        a.enabled = false;
        assert_eq!(next_alarm(&a, WED_10H, 0), None);
    }

    #[test]
    fn test_later_today() {
        assert_eq!(next_alarm(&alarm(11, 30, EVERY_DAY), WED_10H, 0), Some(WED_10H + HOUR + 1_800));
    }

    #[test]
    fn test_passed_today_rings_tomorrow() {
        assert_eq!(
            next_alarm(&alarm(9, 0, EVERY_DAY), WED_10H, 0),
            Some(WED_10H - HOUR + SECONDS_PER_DAY)
        );
    }

    #[test]
    fn test_exactly_now_is_not_future() {
        assert_eq!(
            next_alarm(&alarm(10, 0, EVERY_DAY), WED_10H, 0),
            Some(WED_10H + SECONDS_PER_DAY)
        );
    }

    #[test]
    fn test_skips_to_next_selected_weekday_across_week_end() {
        // Only Monday selected: from Wednesday that is five days ahead.
        let monday = [false, true, false, false, false, false, false];
        let at = next_alarm(&alarm(7, 0, monday), WED_10H, 0).unwrap();
        assert_eq!(at, WED_10H - 3 * HOUR + 5 * SECONDS_PER_DAY);
        assert_eq!(local_weekday(at, 0), Some(1));
    }

    #[test]
    fn test_eight_oclock_rings_seven_next_day() {
        let wed_08h = WED_10H - 2 * HOUR;
        assert_eq!(
            next_alarm(&alarm(7, 0, EVERY_DAY), wed_08h, 0),
            Some(WED_10H - 3 * HOUR + SECONDS_PER_DAY)
        );
    }

    #[test]
    fn test_monday_finds_upcoming_wednesday() {
        let mon_10h = WED_10H - 2 * SECONDS_PER_DAY;
        let wednesday = [false, false, false, true, false, false, false];
        let at = next_alarm(&alarm(7, 0, wednesday), mon_10h, 0).unwrap();
        assert_eq!(at, WED_10H - 3 * HOUR);
        assert_eq!(local_weekday(at, 0), Some(3));
    }

    #[test]
    fn test_sunday_only_wraps_past_saturday() {
        let sunday = [true, false, false, false, false, false, false];
        let at = next_alarm(&alarm(7, 0, sunday), WED_10H, 0).unwrap();
        assert_eq!(at, WED_10H - 3 * HOUR + 4 * SECONDS_PER_DAY);
        assert_eq!(local_weekday(at, 0), Some(0));
    }

    #[test]
    fn test_only_today_selected_but_passed_is_next_week() {
        let wednesday = [false, false, false, true, false, false, false];
        assert_eq!(
            next_alarm(&alarm(9, 0, wednesday), WED_10H, 0),
            Some(WED_10H - HOUR + 7 * SECONDS_PER_DAY)
        );
    }

    #[test]
    fn test_local_offset_moves_the_day() {
        // UTC+2: local time is 12:00, so an 11:00 alarm is tomorrow local,
        // which is 09:00 UTC.
        let at = next_alarm(&alarm(11, 0, EVERY_DAY), WED_10H, 2 * 3_600).unwrap();
        assert_eq!(at, WED_10H - HOUR + SECONDS_PER_DAY);
        let regs = alarm_registers(at).unwrap();
        assert_eq!(regs, AlarmRegisters { hour: 9, minute: 0, day: 4 });
    }

    #[test]
    fn test_local_day_rolls_at_local_midnight() {
        // 23:00 UTC Wednesday is already Thursday at UTC+2.
        let late = WED_10H + 13 * HOUR;
        assert_eq!(local_day(late, 0), Some((2024, 3)));
        assert_eq!(local_day(late, 2 * 3_600), Some((2024, 4)));
    }

    #[test]
    fn test_local_time_applies_offset() {
        assert_eq!(local_time(WED_10H + 1_800, 0), Some((10, 30)));
        assert_eq!(local_time(WED_10H, -5 * 3_600), Some((5, 0)));
    }
}
