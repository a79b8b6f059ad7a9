//! Repair one-sided pairings.

use anyhow::Result;
use fit_client::{Notice, Notifier, PairingManager, ReconcileReport};

use super::{ConsoleNotifier, Session};

/// Run the reconcile command.
pub async fn run(session: &Session) -> Result<()> {
    let pairing = PairingManager::new(session.store.clone(), &session.config);
    let report = pairing.reconcile_all().await?;
    ConsoleNotifier.notify(report_notice(&report));
    Ok(())
}

fn report_notice(report: &ReconcileReport) -> Notice {
    if report.repaired == 0 {
        Notice::info(
            "Pairings Consistent",
            format!("Checked {} paired profile(s).", report.checked),
        )
    } else {
        Notice::success(
            "Pairings Repaired",
            format!(
                "Cleared {} one-sided partner reference(s) out of {} checked.",
                report.repaired, report.checked
            ),
        )
    }
}
