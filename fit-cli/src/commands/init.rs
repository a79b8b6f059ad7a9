//! Create the viewer's account and profile.

use anyhow::Result;
use fit_client::ProfileService;

use super::Session;
use crate::config::ViewerConfig;

/// Run the init command.
pub async fn run(session: &Session, name: &str) -> Result<()> {
    if ViewerConfig::exists(&session.data_dir) {
        anyhow::bail!(
            "Already initialized. Delete {} to start over.",
            ViewerConfig::path(&session.data_dir).display()
        );
    }

    let viewer = ViewerConfig::new(name);
    let profiles = ProfileService::new(session.store.clone(), &session.config)?;
    let profile = profiles
        .create_profile(&viewer.user_id, Some(name.to_string()), None)
        .await?;
    viewer.save(&session.data_dir).await?;

    println!("Profile created!");
    println!();
    println!("  Name:        {}", profile.display_name.as_deref().unwrap_or("(no name)"));
    println!("  Invite code: {}", profile.invite_code);
    println!("  Data dir:    {}", session.data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Share your code: fittogether share");
    println!("  2. Or enter your partner's code: fittogether connect <code>");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use fit_store::RecordStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_creates_viewer_and_profile() {
        let dir = tempdir().unwrap();
        let session = testing::session(dir.path()).await;
        run(&session, "Alex").await.unwrap();

        let viewer = ViewerConfig::load(dir.path()).await.unwrap();
        assert_eq!(viewer.display_name, "Alex");

        let profile = session
            .store
            .find_profile(&viewer.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Alex"));
        assert_eq!(profile.invite_code.len(), 8);
    }

    #[tokio::test]
    async fn init_fails_if_already_initialized() {
        let dir = tempdir().unwrap();
        let session = testing::session(dir.path()).await;

        run(&session, "Alex").await.unwrap();
        assert!(run(&session, "Blake").await.is_err());
    }
}
