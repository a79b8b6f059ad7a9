//! Show claps per day.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use fit_client::EncouragementService;

use super::Session;

/// Run the claps command.
pub async fn run(session: &Session, date: Option<&str>) -> Result<()> {
    let viewer = session.viewer().await?;
    let encouragement = EncouragementService::new(session.store.clone(), &session.config);
    let claps = encouragement
        .daily_claps(&viewer.user_id, &Local::now())
        .await?;

    if let Some(raw) = date {
        let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))?;
        println!("{}: {} clap(s) received", day, claps.claps_for_date(day));
        return Ok(());
    }

    if claps.is_empty() {
        println!(
            "No claps in the last {} days.",
            session.config.encouragement.clap_window_days
        );
        return Ok(());
    }

    println!("Date        Received  Sent");
    for entry in claps.entries() {
        println!(
            "{}  {:>8}  {:>4}",
            entry.date, entry.claps_received, entry.claps_sent
        );
    }
    println!();
    println!(
        "Total: {} received, {} sent",
        claps.total_received(),
        claps.total_sent()
    );
    Ok(())
}
