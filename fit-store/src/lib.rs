//! # fit-store
//!
//! Record store adapter for FitTogether.
//!
//! The [`RecordStore`] trait is the only way the rest of the workspace
//! reads or writes profiles, workouts, messages and voice recordings.
//! Two backends are provided:
//!
//! - [`SqliteStore`] - persistent, used by the CLI
//! - [`MemoryStore`] - in-process, with failure injection for tests
//!
//! ## Pairing writes
//!
//! Partner references are only written through
//! [`RecordStore::set_partner_if_empty`] and
//! [`RecordStore::clear_partner_if`]. Both are conditional, so a write
//! never clobbers a partner that another caller set in the meantime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{
    MessageQuery, NewMessage, NewProfile, NewVoiceRecording, NewWorkout, ProfileDetails,
    RecordStore, WorkoutQuery,
};
