//! Show the viewer's profile and pairing state.

use anyhow::Result;
use fit_client::ProfileService;

use super::Session;
use crate::config::ViewerConfig;

/// Run the status command.
pub async fn run(session: &Session) -> Result<()> {
    println!("=== fittogether status ===");
    println!();

    let viewer = match ViewerConfig::load(&session.data_dir).await {
        Ok(viewer) => viewer,
        Err(_) => {
            println!("Profile: NOT INITIALIZED");
            println!();
            println!("Run 'fittogether init --name <name>' to get started.");
            return Ok(());
        }
    };

    let profiles = ProfileService::new(session.store.clone(), &session.config)?;
    let view = profiles.load(&viewer.user_id).await?;

    println!("Profile:");
    println!("  Name:        {}", view.profile.display_name.as_deref().unwrap_or("(no name)"));
    println!("  Invite code: {}", view.profile.invite_code);
    println!("  Since:       {}", view.profile.created_at.format("%Y-%m-%d"));
    println!();

    if view.is_connected() {
        println!("Partner: {}", view.partner_name());
    } else if view.profile.is_paired() {
        println!("Partner: INCONSISTENT (run 'fittogether reconcile')");
    } else {
        println!("Partner: NOT CONNECTED");
        println!();
        println!("Run 'fittogether share' or 'fittogether connect <code>'");
    }

    Ok(())
}
