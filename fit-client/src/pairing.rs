//! Partner pairing through invite codes.
//!
//! A pairing is two partner references pointing at each other. Both halves
//! are written with the store's conditional update, viewer first, so a
//! concurrent `connect` that already claimed either profile makes this one
//! fail with [`PairingError::AlreadyPaired`] instead of overwriting it. The
//! exception is the target redeeming the viewer's code at the same moment:
//! both halves then already agree and the connect succeeds.
//! When the second half fails, the first is rolled back; only if the
//! rollback also fails does the caller see
//! [`PairingError::PartialPairingFailure`].
//!
//! ```text
//! normalise code → lookup owner → reject self → both unpaired?
//!     → CAS viewer.partner → CAS owner.partner → done
//!                               ↓ (lost / failed)
//!                        clear viewer.partner
//! ```

use fit_core::ShareMessage;
use fit_store::RecordStore;
use fit_types::{InviteCode, Profile, UserId};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{ClientResult, PairingError};
use crate::notify::{Notice, Notifier, NullNotifier, ShareSurface};

/// Label used in the success notice when the partner has no display name.
const UNNAMED_PARTNER: &str = "your partner";

/// The profile on the other end of a successful connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedPartner {
    /// Partner's user id.
    pub user_id: UserId,
    /// Partner's display name.
    pub display_name: Option<String>,
}

impl PairedPartner {
    fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name.clone(),
        }
    }

    /// Display name, or a generic label.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(UNNAMED_PARTNER)
    }
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Profiles inspected.
    pub checked: usize,
    /// One-sided references cleared.
    pub repaired: usize,
}

impl ReconcileReport {
    fn merge(&mut self, other: ReconcileReport) {
        self.checked += other.checked;
        self.repaired += other.repaired;
    }
}

/// Establishes and repairs pairings.
pub struct PairingManager<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    auto_reconcile: bool,
    app_name: String,
}

impl<S: RecordStore> PairingManager<S> {
    /// Create a manager over `store`.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            notifier: Arc::new(NullNotifier),
            auto_reconcile: config.pairing.auto_reconcile,
            app_name: config.share.app_name.clone(),
        }
    }

    /// Send notices to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Pair `viewer` with the owner of `raw_code`.
    ///
    /// The code is trimmed and upper-cased before lookup. Nothing is written
    /// unless every precondition holds.
    pub async fn connect(
        &self,
        viewer: &UserId,
        raw_code: &str,
    ) -> Result<PairedPartner, PairingError> {
        let code = InviteCode::parse(raw_code).map_err(|_| PairingError::InvalidInviteCode)?;

        let target = self
            .store
            .find_profile_by_invite_code(&code)
            .await?
            .ok_or(PairingError::InvalidInviteCode)?;

        if &target.user_id == viewer {
            warn!(user = %viewer, "rejected pairing with own invite code");
            return Err(PairingError::SelfPairingRejected);
        }

        let own = self
            .store
            .find_profile(viewer)
            .await?
            .ok_or(PairingError::ProfileNotFound(*viewer))?;

        if own.is_paired() || target.is_paired() {
            warn!(user = %viewer, target = %target.user_id, "rejected pairing, already paired");
            return Err(PairingError::AlreadyPaired);
        }

        self.link(viewer, &target.user_id).await?;

        info!(user = %viewer, partner = %target.user_id, "partners connected");
        Ok(PairedPartner::from_profile(&target))
    }

    /// Write both halves of the link, rolling back the first on failure.
    async fn link(&self, viewer: &UserId, target: &UserId) -> Result<(), PairingError> {
        if !self.store.set_partner_if_empty(viewer, target).await? {
            warn!(user = %viewer, "viewer was paired concurrently");
            return Err(PairingError::AlreadyPaired);
        }

        let failure = match self.store.set_partner_if_empty(target, viewer).await {
            Ok(true) => return Ok(()),
            // The target may have redeemed the viewer's code at the same time.
            Ok(false) => match self.store.find_profile(target).await {
                Ok(Some(profile)) if profile.is_paired_with(viewer) => {
                    info!(
                        user = %viewer,
                        target = %target,
                        "mutual connect completed concurrently"
                    );
                    return Ok(());
                }
                Ok(_) => {
                    warn!(user = %viewer, target = %target, "target was paired concurrently");
                    PairingError::AlreadyPaired
                }
                Err(e) => PairingError::StoreUnavailable(e),
            },
            Err(e) => PairingError::StoreUnavailable(e),
        };

        match self.store.clear_partner_if(viewer, target).await {
            Ok(_) => Err(failure),
            Err(rollback) => {
                error!(
                    user = %viewer,
                    target = %target,
                    cause = %failure,
                    rollback = %rollback,
                    "pairing left one-sided"
                );
                if self.auto_reconcile {
                    self.reconcile_pair(viewer, target).await;
                }
                Err(PairingError::PartialPairingFailure {
                    linked: *viewer,
                    unlinked: *target,
                })
            }
        }
    }

    async fn reconcile_pair(&self, a: &UserId, b: &UserId) {
        for user in [a, b] {
            match self.reconcile_user(user).await {
                Ok(report) if report.repaired > 0 => {
                    info!(user = %user, "one-sided pairing repaired");
                }
                Ok(_) => {}
                Err(e) => warn!(user = %user, error = %e, "automatic reconcile failed"),
            }
        }
    }

    /// UI-facing connect: returns `true` on success and emits exactly one
    /// notice either way.
    pub async fn connect_partner(&self, viewer: &UserId, raw_code: &str) -> bool {
        match self.connect(viewer, raw_code).await {
            Ok(partner) => {
                self.notifier.notify(Notice::success(
                    "Partner Connected!",
                    format!("You're now connected with {}!", partner.label()),
                ));
                true
            }
            Err(e) => {
                self.notifier.notify(e.notice());
                false
            }
        }
    }

    /// Compose the share text for `code` and hand it to `surface`.
    pub async fn share_invite_code(
        &self,
        code: &InviteCode,
        surface: &dyn ShareSurface,
    ) -> ClientResult<ShareMessage> {
        let message = ShareMessage::for_invite_code(code, &self.app_name);
        surface.share(&message).await?;
        Ok(message)
    }

    /// Clear `user`'s partner reference if the partner does not point back.
    pub async fn reconcile_user(&self, user: &UserId) -> ClientResult<ReconcileReport> {
        let Some(profile) = self.store.find_profile(user).await? else {
            return Ok(ReconcileReport::default());
        };
        self.reconcile_profile(&profile).await
    }

    async fn reconcile_profile(&self, profile: &Profile) -> ClientResult<ReconcileReport> {
        let mut report = ReconcileReport {
            checked: 1,
            repaired: 0,
        };
        let Some(partner_id) = profile.partner_id else {
            return Ok(report);
        };

        let partner = self.store.find_profile(&partner_id).await?;
        let points_back = partner
            .as_ref()
            .map_or(false, |p| p.is_paired_with(&profile.user_id));
        if points_back {
            return Ok(report);
        }

        warn!(
            user = %profile.user_id,
            partner = %partner_id,
            "clearing one-sided partner reference"
        );
        if self
            .store
            .clear_partner_if(&profile.user_id, &partner_id)
            .await?
        {
            report.repaired = 1;
        }
        Ok(report)
    }

    /// Sweep every paired profile and clear one-sided references.
    pub async fn reconcile_all(&self) -> ClientResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for profile in self.store.list_paired_profiles().await? {
            report.merge(self.reconcile_profile(&profile).await?);
        }
        info!(
            checked = report.checked,
            repaired = report.repaired,
            "reconcile sweep finished"
        );
        Ok(report)
    }
}
