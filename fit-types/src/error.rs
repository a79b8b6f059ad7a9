//! Error types for FitTogether record parsing.

use thiserror::Error;

/// Errors raised while parsing or validating record values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Identifier was not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Invite code was empty or contained invalid characters.
    #[error("invalid invite code: {0}")]
    InvalidInviteCode(String),

    /// Message kind discriminator was not recognised.
    #[error("unknown message kind: {0}")]
    UnknownMessageKind(String),
}
