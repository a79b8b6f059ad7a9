//! Pair with a partner using their invite code.

use anyhow::Result;
use fit_client::PairingManager;
use std::sync::Arc;

use super::{ConsoleNotifier, Reported, Session};

/// Run the connect command.
pub async fn run(session: &Session, code: &str) -> Result<()> {
    let viewer = session.viewer().await?;
    let pairing = PairingManager::new(session.store.clone(), &session.config)
        .with_notifier(Arc::new(ConsoleNotifier));

    // The notifier has already printed the failure.
    if !pairing.connect_partner(&viewer.user_id, code).await {
        return Err(Reported.into());
    }
    Ok(())
}
