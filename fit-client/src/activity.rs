//! Workout logging and activity summaries.

use chrono::{DateTime, TimeZone, Utc};
use fit_core::{streak, weekly_stats, WeeklyStats};
use fit_store::{NewWorkout, RecordStore, WorkoutQuery};
use fit_types::{ActivityType, UserId, Workout};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// A workout as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct LogWorkout {
    /// Kind of session. Required.
    pub activity_type: String,
    /// Duration in minutes; the configured default when absent.
    pub duration_minutes: Option<u32>,
    /// Calorie estimate.
    pub calories: Option<u32>,
    /// Completion time; now when absent.
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl LogWorkout {
    /// A workout of `activity_type` with every other field defaulted.
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self {
            activity_type: activity_type.into(),
            ..Default::default()
        }
    }
}

/// Weekly totals and streak for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySummary {
    /// Workouts and calories this week.
    pub weekly: WeeklyStats,
    /// Consecutive days with a workout, ending today.
    pub streak: u32,
    /// Weekly workout goal.
    pub goal: u32,
}

impl ActivitySummary {
    /// Percentage of the weekly goal reached, capped at 100.
    pub fn goal_progress(&self) -> u32 {
        self.weekly.goal_progress(self.goal)
    }
}

/// Logs workouts and summarises workout history.
pub struct ActivityService<S> {
    store: S,
    history_limit: u32,
    weekly_goal: u32,
    default_duration_minutes: u32,
}

impl<S: RecordStore> ActivityService<S> {
    /// Create a service over `store`.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            history_limit: config.activity.history_limit,
            weekly_goal: config.activity.weekly_goal,
            default_duration_minutes: config.activity.default_duration_minutes,
        }
    }

    /// Store a workout for `viewer`.
    pub async fn log_workout(&self, viewer: &UserId, req: LogWorkout) -> ClientResult<Workout> {
        let activity_type = req.activity_type.trim();
        if activity_type.is_empty() {
            return Err(ClientError::InvalidInput(
                "Please select a workout type".into(),
            ));
        }
        let duration_minutes = req.duration_minutes.unwrap_or(self.default_duration_minutes);
        if duration_minutes == 0 {
            return Err(ClientError::InvalidInput(
                "Duration must be at least one minute".into(),
            ));
        }

        let workout = self
            .store
            .insert_workout(NewWorkout {
                user_id: *viewer,
                activity_type: ActivityType::from(activity_type),
                duration_minutes,
                calories: req.calories,
                completed_at: req.completed_at.unwrap_or_else(Utc::now),
                notes: req.notes.filter(|n| !n.trim().is_empty()),
            })
            .await?;

        info!(
            user = %viewer,
            activity = %workout.activity_type,
            minutes = workout.duration_minutes,
            "workout logged"
        );
        Ok(workout)
    }

    /// Latest workouts of `user`, newest first.
    pub async fn recent_workouts(&self, user: &UserId) -> ClientResult<Vec<Workout>> {
        let workouts = self
            .store
            .query_workouts(&WorkoutQuery::recent(*user, self.history_limit))
            .await?;
        debug!(user = %user, count = workouts.len(), "fetched workout history");
        Ok(workouts)
    }

    /// Weekly totals and streak of `user`, with calendar days taken in the
    /// timezone of `now`.
    pub async fn summary<Tz: TimeZone>(
        &self,
        user: &UserId,
        now: &DateTime<Tz>,
    ) -> ClientResult<ActivitySummary> {
        let workouts = self.recent_workouts(user).await?;
        Ok(ActivitySummary {
            weekly: weekly_stats(&workouts, now),
            streak: streak(&workouts, now),
            goal: self.weekly_goal,
        })
    }

    /// Summary of the viewer's current partner.
    pub async fn partner_summary<Tz: TimeZone>(
        &self,
        viewer: &UserId,
        now: &DateTime<Tz>,
    ) -> ClientResult<ActivitySummary> {
        let profile = self
            .store
            .find_profile(viewer)
            .await?
            .ok_or(ClientError::ProfileNotFound(*viewer))?;
        let partner = profile.partner_id.ok_or(ClientError::NotPaired)?;
        self.summary(&partner, now).await
    }
}
