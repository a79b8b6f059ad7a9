//! Log a workout.

use anyhow::Result;
use fit_client::{ActivityService, LogWorkout};

use super::{fail, Session};

/// Run the log command.
pub async fn run(session: &Session, req: LogWorkout) -> Result<()> {
    let viewer = session.viewer().await?;
    let activity = ActivityService::new(session.store.clone(), &session.config);
    let workout = activity
        .log_workout(&viewer.user_id, req)
        .await
        .map_err(|e| fail(e.notice()))?;

    println!("Workout Logged!");
    println!(
        "  {} for {} min{}",
        workout.activity_type,
        workout.duration_minutes,
        workout
            .calories
            .map(|c| format!(", {} kcal", c))
            .unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use fit_store::{RecordStore, WorkoutQuery};
    use tempfile::tempdir;

    #[tokio::test]
    async fn log_stores_workout() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("fit.db");
        let session = testing::initialized(dir.path(), "Alex", &db).await;

        run(
            &session,
            LogWorkout {
                calories: Some(250),
                ..LogWorkout::new("Cardio")
            },
        )
        .await
        .unwrap();

        let viewer = session.viewer().await.unwrap();
        let rows = session
            .store
            .query_workouts(&WorkoutQuery::recent(viewer.user_id, 10))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].duration_minutes, 30);
        assert_eq!(rows[0].calories, Some(250));
    }

    #[tokio::test]
    async fn log_rejects_blank_type() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("fit.db");
        let session = testing::initialized(dir.path(), "Alex", &db).await;

        let err = run(&session, LogWorkout::new(" ")).await.unwrap_err();
        assert!(err.to_string().contains("Missing Information"));
    }
}
