//! Print the viewer's invite message and share link.

use anyhow::Result;
use async_trait::async_trait;
use fit_client::{PairingManager, ShareError, ShareSurface};
use fit_core::ShareMessage;
use fit_store::RecordStore;

use super::Session;

/// Share surface that writes to stdout.
struct TerminalShare;

#[async_trait]
impl ShareSurface for TerminalShare {
    async fn share(&self, message: &ShareMessage) -> Result<(), ShareError> {
        println!("{}", message.text());
        println!();
        println!("Share link: {}", message.whatsapp_url());
        Ok(())
    }
}

/// Run the share command.
pub async fn run(session: &Session) -> Result<()> {
    let viewer = session.viewer().await?;
    let profile = session
        .store
        .find_profile(&viewer.user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No profile for this viewer. Run 'fittogether init'."))?;

    let pairing = PairingManager::new(session.store.clone(), &session.config);
    pairing
        .share_invite_code(&profile.invite_code, &TerminalShare)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use tempfile::tempdir;

    #[tokio::test]
    async fn share_after_init() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("fit.db");
        let session = testing::initialized(dir.path(), "Alex", &db).await;
        assert!(run(&session).await.is_ok());
    }

    #[tokio::test]
    async fn share_requires_init() {
        let dir = tempdir().unwrap();
        let session = testing::session(dir.path()).await;
        assert!(run(&session).await.is_err());
    }
}
