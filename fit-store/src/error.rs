//! Error types for the record store.

use std::path::PathBuf;

use fit_types::{InviteCode, UserId};

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Another profile already holds this invite code.
    #[error("invite code already in use: {code}")]
    DuplicateInviteCode {
        /// The colliding code.
        code: InviteCode,
    },

    /// A profile already exists for this user.
    #[error("profile already exists for user {user_id}")]
    DuplicateProfile {
        /// The user whose profile exists.
        user_id: UserId,
    },

    /// No profile exists for this user.
    #[error("profile not found for user {user_id}")]
    ProfileNotFound {
        /// The user that was looked up.
        user_id: UserId,
    },

    /// A stored or submitted record is malformed.
    #[error("invalid record: {reason}")]
    InvalidRecord {
        /// What was wrong with it.
        reason: String,
    },

    /// The backend is unreachable or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database path error.
    #[error("invalid database path: {path}")]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
    },
}

impl StorageError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        StorageError::InvalidRecord {
            reason: reason.into(),
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
