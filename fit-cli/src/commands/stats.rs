//! Show weekly progress and streak.

use anyhow::Result;
use chrono::Local;
use fit_client::{ActivityService, ActivitySummary};

use super::{fail, Session};

fn print_summary(heading: &str, summary: &ActivitySummary) {
    println!("{}:", heading);
    println!(
        "  This week: {}/{} workouts ({}%)",
        summary.weekly.weekly_workouts,
        summary.goal,
        summary.goal_progress()
    );
    println!("  Calories:  {}", summary.weekly.total_calories);
    println!("  Streak:    {} day(s)", summary.streak);
}

/// Run the stats command.
pub async fn run(session: &Session, partner: bool) -> Result<()> {
    let viewer = session.viewer().await?;
    let activity = ActivityService::new(session.store.clone(), &session.config);
    let now = Local::now();

    let summary = activity.summary(&viewer.user_id, &now).await?;
    print_summary("You", &summary);

    if partner {
        let partner_summary = activity
            .partner_summary(&viewer.user_id, &now)
            .await
            .map_err(|e| fail(e.notice()))?;
        println!();
        print_summary("Partner", &partner_summary);
    }

    let recent = activity.recent_workouts(&viewer.user_id).await?;
    if !recent.is_empty() {
        println!();
        println!("Recent workouts:");
        for workout in recent.iter().take(5) {
            println!(
                "  {}  {} ({} min)",
                workout.completed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                workout.activity_type,
                workout.duration_minutes
            );
        }
    }
    Ok(())
}
