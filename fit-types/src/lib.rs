//! # fit-types
//!
//! Record and identity types shared by all FitTogether crates.
//!
//! - [`UserId`], [`WorkoutId`], [`MessageId`], [`RecordingId`] - identifiers
//! - [`InviteCode`] - normalised, case-insensitive pairing code
//! - [`Profile`], [`Workout`], [`Message`], [`VoiceRecording`] - stored records
//! - [`TypeError`] - parse and validation errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod invite;
mod records;

pub use error::TypeError;
pub use ids::{MessageId, RecordingId, UserId, WorkoutId};
pub use invite::InviteCode;
pub use records::{
    ActivityType, Message, MessageKind, Profile, VoiceRecording, Workout, DEFAULT_PARTNER_LABEL,
};
