//! Next-fire computation for weekday/time-of-day recurrences.
//!
//! Works on local wall-clock time (`NaiveDateTime`); the scheduler converts
//! to and from real instants.

use chrono::{Datelike, Duration, NaiveDateTime};

use super::types::{parse_time_of_day, StudyReminder};

/// The first instant strictly after `after` that falls on one of `days`
/// (Sunday = 0) at `time` (`HH:MM`). `None` if the time cannot be parsed or
/// no valid weekday is listed.
pub fn next_occurrence(time: &str, days: &[u8], after: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = parse_time_of_day(time)?;
    // eight days covers "same weekday next week, earlier time already passed today"
    (0..=7).find_map(|offset| {
        let date = after.date() + Duration::days(offset);
        let weekday = date.weekday().num_days_from_sunday() as u8;
        let candidate = date.and_time(time);
        (days.contains(&weekday) && candidate > after).then_some(candidate)
    })
}

pub fn next_fire_after(reminder: &StudyReminder, after: NaiveDateTime) -> Option<NaiveDateTime> {
    if !reminder.is_active {
        return None;
    }
    next_occurrence(&reminder.time, &reminder.days, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // 2026-06-01 is a Monday (weekday 1)
    #[test]
    fn fires_later_today_when_time_not_passed() {
        let next = next_occurrence("16:30", &[1], at(2026, 6, 1, 9, 0)).unwrap();
        assert_eq!(next, at(2026, 6, 1, 16, 30));
    }

    #[test]
    fn skips_to_next_listed_day_when_time_passed() {
        // Monday and Wednesday; it's Monday evening
        let next = next_occurrence("16:30", &[1, 3], at(2026, 6, 1, 18, 0)).unwrap();
        assert_eq!(next, at(2026, 6, 3, 16, 30));
    }

    #[test]
    fn same_weekday_next_week() {
        let next = next_occurrence("08:00", &[1], at(2026, 6, 1, 8, 0)).unwrap();
        assert_eq!(next, at(2026, 6, 8, 8, 0));
    }

    #[test]
    fn sunday_is_zero() {
        let next = next_occurrence("10:00", &[0], at(2026, 6, 1, 9, 0)).unwrap();
        assert_eq!(next, at(2026, 6, 7, 10, 0));
    }

    #[test]
    fn bad_inputs_never_fire() {
        assert!(next_occurrence("25:99", &[1], at(2026, 6, 1, 9, 0)).is_none());
        assert!(next_occurrence("10:00", &[], at(2026, 6, 1, 9, 0)).is_none());
        assert!(next_occurrence("10:00", &[9], at(2026, 6, 1, 9, 0)).is_none());
    }
}
