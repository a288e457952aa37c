//! Day-gap streak arithmetic shared by the progress engine and the
//! adaptive-learning analytics.
//!
//! "Days elapsed" is the floor of the millisecond difference divided by one
//! day. It is not normalized to local midnight: 23 hours apart is 0 days even
//! when the two instants fall on different calendar dates.

use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days between `earlier` and `later`. Negative if `later` precedes `earlier`.
pub fn days_elapsed(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Running streak counters as stored in the progress document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub last_credited: Option<DateTime<Utc>>,
}

/// What [`advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First credited day ever.
    Started,
    /// Exactly one day since the last credit.
    Extended,
    /// More than one day since the last credit; streak restarted at 1.
    Reset { previous: u32 },
    /// Already credited within the last day.
    Unchanged,
}

/// Credit a study day at `now`.
pub fn advance(state: StreakState, now: DateTime<Utc>) -> (StreakState, StreakChange) {
    let Some(last) = state.last_credited else {
        let next = StreakState {
            current: 1,
            longest: state.longest.max(1),
            last_credited: Some(now),
        };
        return (next, StreakChange::Started);
    };

    match days_elapsed(last, now) {
        1 => {
            let current = state.current + 1;
            let next = StreakState {
                current,
                longest: state.longest.max(current),
                last_credited: Some(now),
            };
            (next, StreakChange::Extended)
        }
        d if d > 1 => {
            let next = StreakState {
                current: 1,
                longest: state.longest.max(state.current),
                last_credited: Some(now),
            };
            (next, StreakChange::Reset { previous: state.current })
        }
        // 0 days, or a clock that went backwards
        _ => (state, StreakChange::Unchanged),
    }
}

/// Streak derived from a set of activity timestamps: the number of
/// consecutive days, counting back from `now`, that have at least one activity.
/// Activities from the future are ignored.
pub fn streak_from_history(now: DateTime<Utc>, timestamps: &[DateTime<Utc>]) -> u32 {
    let mut sorted: Vec<DateTime<Utc>> = timestamps.iter().copied().filter(|t| *t <= now).collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak: i64 = 0;
    for t in sorted {
        let gap = days_elapsed(t, now);
        if gap == streak {
            streak += 1;
        } else if gap > streak {
            break;
        }
    }
    streak as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2026-05-04T18:00:00Z".parse().unwrap()
    }

    #[test]
    fn days_elapsed_floors() {
        assert_eq!(days_elapsed(t0(), t0() + Duration::hours(23)), 0);
        assert_eq!(days_elapsed(t0(), t0() + Duration::hours(24)), 1);
        assert_eq!(days_elapsed(t0(), t0() + Duration::hours(47)), 1);
        assert_eq!(days_elapsed(t0(), t0() + Duration::hours(48)), 2);
    }

    #[test]
    fn first_credit_starts_streak() {
        let empty = StreakState { current: 0, longest: 0, last_credited: None };
        let (state, change) = advance(empty, t0());
        assert_eq!(change, StreakChange::Started);
        assert_eq!(state.current, 1);
        assert_eq!(state.longest, 1);
    }

    #[test]
    fn consecutive_days_extend_then_gap_resets() {
        let mut state = StreakState { current: 0, longest: 0, last_credited: None };
        let mut now = t0();
        for expected in 1..=4 {
            state = advance(state, now).0;
            assert_eq!(state.current, expected);
            now += Duration::hours(24);
        }

        let (state, change) = advance(state, now + Duration::hours(48));
        assert_eq!(change, StreakChange::Reset { previous: 4 });
        assert_eq!(state.current, 1);
        assert_eq!(state.longest, 4);
    }

    #[test]
    fn same_day_is_unchanged() {
        let state = StreakState { current: 3, longest: 5, last_credited: Some(t0()) };
        let (next, change) = advance(state, t0() + Duration::hours(5));
        assert_eq!(change, StreakChange::Unchanged);
        assert_eq!(next, state);
    }

    #[test]
    fn history_streak_counts_back_from_now() {
        let now = t0();
        let history = vec![
            now - Duration::hours(1),
            now - Duration::hours(2),
            now - Duration::hours(25),
            now - Duration::hours(49),
            now - Duration::hours(24 * 5),
        ];
        assert_eq!(streak_from_history(now, &history), 3);
    }

    #[test]
    fn history_streak_is_zero_when_nothing_today() {
        let now = t0();
        let history = vec![now - Duration::hours(30)];
        assert_eq!(streak_from_history(now, &history), 0);
        assert_eq!(streak_from_history(now, &[]), 0);
    }
}
