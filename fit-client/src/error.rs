//! Error types for the client services.

use fit_core::InviteCodeError;
use fit_store::StorageError;
use fit_types::UserId;
use thiserror::Error;

use crate::config::ConfigError;
use crate::notify::{Notice, ShareError};

/// Failures of a connect attempt.
#[derive(Debug, Error)]
pub enum PairingError {
    /// The code is empty, malformed, or belongs to nobody.
    #[error("invalid invite code")]
    InvalidInviteCode,

    /// The code belongs to the viewer.
    #[error("cannot pair with your own invite code")]
    SelfPairingRejected,

    /// The viewer or the code owner already has a partner.
    #[error("one of the users is already paired")]
    AlreadyPaired,

    /// One side of the link was written and could not be rolled back.
    #[error("pairing left {linked} pointing at {unlinked} without a reference back")]
    PartialPairingFailure {
        /// User whose partner reference was written.
        linked: UserId,
        /// User whose partner reference is missing.
        unlinked: UserId,
    },

    /// The viewer has no profile.
    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// The record store failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
}

impl PairingError {
    /// The notification shown for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            PairingError::InvalidInviteCode => Notice::error(
                "Invalid Invite Code",
                "The invite code you entered is not valid.",
            ),
            PairingError::SelfPairingRejected => Notice::error(
                "Cannot Use Own Code",
                "You cannot use your own invite code.",
            ),
            PairingError::AlreadyPaired => Notice::error(
                "Already Connected",
                "One of you is already connected to another partner.",
            ),
            PairingError::PartialPairingFailure { .. } => Notice::error(
                "Connection Failed",
                "The connection was only half completed. Run a reconcile and try again.",
            ),
            PairingError::ProfileNotFound(_) => Notice::error(
                "Connection Failed",
                "Your profile could not be found. Set up your profile first.",
            ),
            PairingError::StoreUnavailable(_) => Notice::error(
                "Connection Failed",
                "Failed to connect with partner. Please try again.",
            ),
        }
    }
}

/// Client service errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation needs an active pairing.
    #[error("not connected to a partner")]
    NotPaired,

    /// A request field is missing or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No unique invite code was found within the attempt budget.
    #[error("no unique invite code after {attempts} attempts")]
    InviteCodeExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// The user has no profile.
    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// Invite code generation failed.
    #[error("invite code generation failed: {0}")]
    InviteCode(#[from] InviteCodeError),

    /// Pairing error.
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The share surface rejected the message.
    #[error(transparent)]
    Share(#[from] ShareError),
}

impl ClientError {
    /// The notification shown for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            ClientError::NotPaired => Notice::error(
                "No Partner Yet",
                "Connect with a partner before sending encouragement.",
            ),
            ClientError::InvalidInput(reason) => Notice::error("Missing Information", reason.clone()),
            ClientError::InviteCodeExhausted { .. } => Notice::error(
                "Error",
                "Could not create an invite code. Please try again.",
            ),
            ClientError::ProfileNotFound(_) => Notice::error(
                "Profile Not Found",
                "Set up your profile first.",
            ),
            ClientError::InviteCode(_) => Notice::error(
                "Error",
                "Could not create an invite code. Please try again.",
            ),
            ClientError::Pairing(err) => err.notice(),
            ClientError::Storage(_) => Notice::error("Error", "Something went wrong. Please try again."),
            ClientError::Config(err) => Notice::error("Configuration Error", err.to_string()),
            ClientError::Share(_) => Notice::error("Share Failed", "Could not share your invite code."),
        }
    }
}

/// Result alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;

    #[test]
    fn pairing_notices_match_titles() {
        assert_eq!(
            PairingError::InvalidInviteCode.notice().title,
            "Invalid Invite Code"
        );
        assert_eq!(
            PairingError::SelfPairingRejected.notice().title,
            "Cannot Use Own Code"
        );
        assert_eq!(PairingError::AlreadyPaired.notice().title, "Already Connected");
        let partial = PairingError::PartialPairingFailure {
            linked: UserId::new(),
            unlinked: UserId::new(),
        };
        assert_eq!(partial.notice().title, "Connection Failed");
        assert_eq!(partial.notice().severity, Severity::Error);
    }

    #[test]
    fn client_error_delegates_pairing_notice() {
        let err = ClientError::from(PairingError::AlreadyPaired);
        assert_eq!(err.notice().title, "Already Connected");
        assert_eq!(err.to_string(), "one of the users is already paired");
    }
}
