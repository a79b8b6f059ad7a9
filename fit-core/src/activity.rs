//! Activity aggregation: weekly totals and consecutive-day streaks.
//!
//! Both functions are pure over an already-fetched workout history and the
//! viewer's `now`. Nothing is cached; callers recompute whenever the
//! history is reloaded.

use chrono::{DateTime, TimeZone};
use fit_types::Workout;
use serde::{Deserialize, Serialize};

use crate::clock::{days_between, local_date, today, week_start};

/// Default weekly workout goal.
pub const DEFAULT_WEEKLY_GOAL: u32 = 5;

/// Totals for the current calendar week (Sunday through now).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    /// Number of workouts completed this week.
    pub weekly_workouts: u32,
    /// Sum of calorie estimates; missing estimates count as 0.
    pub total_calories: u64,
}

impl WeeklyStats {
    /// Progress toward `goal` as a percentage, capped at 100.
    pub fn goal_progress(&self, goal: u32) -> u32 {
        if goal == 0 {
            return 100;
        }
        let pct = u64::from(self.weekly_workouts) * 100 / u64::from(goal);
        pct.min(100) as u32
    }
}

/// Count workouts and calories since the most recent Sunday at local
/// midnight.
///
/// Input order does not matter.
pub fn weekly_stats<Tz: TimeZone>(workouts: &[Workout], now: &DateTime<Tz>) -> WeeklyStats {
    let tz = now.timezone();
    let start = week_start(now);

    workouts
        .iter()
        .filter(|w| local_date(&w.completed_at, &tz) >= start)
        .fold(WeeklyStats::default(), |mut acc, w| {
            acc.weekly_workouts += 1;
            acc.total_calories += u64::from(w.calories.unwrap_or(0));
            acc
        })
}

/// Consecutive local days with at least one workout, ending today.
///
/// `workouts` must be ordered newest first. Walking the list, a workout
/// `n` days before today extends the streak when `n` equals the current
/// streak, ends it when `n` is larger (a gap), and is skipped when smaller
/// (another workout on an already-counted day). Without a workout today
/// the streak is 0.
pub fn streak<Tz: TimeZone>(workouts: &[Workout], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let today = today(now);
    let mut streak: u32 = 0;

    for workout in workouts {
        let days_diff = days_between(today, local_date(&workout.completed_at, &tz));

        if days_diff == i64::from(streak) {
            streak += 1;
        } else if days_diff > i64::from(streak) {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};
    use fit_types::{ActivityType, UserId, WorkoutId};

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    /// Friday 2026-10-16 18:00 local.
    fn now() -> DateTime<FixedOffset> {
        tz().with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap()
    }

    fn workout_at(local: DateTime<FixedOffset>, calories: Option<u32>) -> Workout {
        Workout {
            id: WorkoutId::new(),
            user_id: UserId::new(),
            activity_type: ActivityType::Cardio,
            duration_minutes: 30,
            calories,
            completed_at: local.with_timezone(&Utc),
            notes: None,
        }
    }

    fn days_ago(days: i64, hour: u32) -> Workout {
        let day = now() - Duration::days(days);
        let local = tz()
            .from_local_datetime(&day.date_naive().and_hms_opt(hour, 0, 0).unwrap())
            .unwrap();
        workout_at(local, Some(100))
    }

    #[test]
    fn weekly_stats_example() {
        let workouts = vec![
            workout_at(now() - Duration::hours(2), Some(100)),
            workout_at(now() - Duration::days(2), Some(200)),
            // Friday of the previous week
            workout_at(now() - Duration::days(7), Some(50)),
        ];

        assert_eq!(
            weekly_stats(&workouts, &now()),
            WeeklyStats {
                weekly_workouts: 2,
                total_calories: 300
            }
        );
    }

    #[test]
    fn weekly_stats_includes_sunday_midnight() {
        let sunday_midnight = tz().with_ymd_and_hms(2026, 10, 11, 0, 0, 0).unwrap();
        let saturday_late = tz().with_ymd_and_hms(2026, 10, 10, 23, 59, 59).unwrap();
        let workouts = vec![
            workout_at(sunday_midnight, None),
            workout_at(saturday_late, Some(400)),
        ];

        let stats = weekly_stats(&workouts, &now());
        assert_eq!(stats.weekly_workouts, 1);
        assert_eq!(stats.total_calories, 0);
    }

    #[test]
    fn weekly_stats_uses_viewer_timezone() {
        // Sunday 03:00 UTC is still Saturday evening at UTC-5
        let ts = Utc.with_ymd_and_hms(2026, 10, 11, 3, 0, 0).unwrap();
        let workouts = vec![workout_at(ts.with_timezone(&tz()), Some(10))];

        assert_eq!(weekly_stats(&workouts, &now()).weekly_workouts, 0);

        let utc_now = now().with_timezone(&Utc);
        assert_eq!(weekly_stats(&workouts, &utc_now).weekly_workouts, 1);
    }

    #[test]
    fn weekly_stats_empty() {
        assert_eq!(weekly_stats(&[], &now()), WeeklyStats::default());
    }

    #[test]
    fn goal_progress_caps_at_100() {
        let stats = WeeklyStats {
            weekly_workouts: 3,
            total_calories: 0,
        };
        assert_eq!(stats.goal_progress(5), 60);
        assert_eq!(stats.goal_progress(2), 100);
        assert_eq!(stats.goal_progress(0), 100);
    }

    #[test]
    fn streak_today_and_yesterday() {
        let workouts = vec![days_ago(0, 7), days_ago(1, 7)];
        assert_eq!(streak(&workouts, &now()), 2);
    }

    #[test]
    fn streak_gap_breaks_chain() {
        let workouts = vec![days_ago(0, 7), days_ago(3, 7)];
        assert_eq!(streak(&workouts, &now()), 1);
    }

    #[test]
    fn streak_empty_history() {
        assert_eq!(streak(&[], &now()), 0);
    }

    #[test]
    fn streak_counts_each_day_once() {
        let workouts = vec![
            days_ago(0, 17),
            days_ago(0, 6),
            days_ago(1, 20),
            days_ago(1, 8),
            days_ago(2, 12),
        ];
        assert_eq!(streak(&workouts, &now()), 3);
    }

    #[test]
    fn streak_requires_workout_today() {
        // Yesterday and the day before, nothing today
        let workouts = vec![days_ago(1, 7), days_ago(2, 7)];
        assert_eq!(streak(&workouts, &now()), 0);
    }

    #[test]
    fn streak_skips_future_workouts() {
        let future = workout_at(now() + Duration::days(1), Some(10));
        let workouts = vec![future, days_ago(0, 7), days_ago(1, 7)];
        assert_eq!(streak(&workouts, &now()), 2);
    }

    #[test]
    fn streak_late_night_workout_counts_for_local_day() {
        // 23:30 local yesterday is already "today" in UTC
        let late = tz().with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap();
        let workouts = vec![days_ago(0, 9), workout_at(late, None)];
        assert_eq!(streak(&workouts, &now()), 2);
    }

    #[test]
    fn streak_is_idempotent() {
        let workouts = vec![days_ago(0, 7), days_ago(1, 7), days_ago(2, 7), days_ago(5, 7)];
        let first = streak(&workouts, &now());
        for _ in 0..5 {
            assert_eq!(streak(&workouts, &now()), first);
        }
        assert_eq!(first, 3);
    }
}
