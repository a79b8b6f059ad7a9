//! # fit-core
//!
//! Pure logic for FitTogether (no I/O, instant tests).
//!
//! This crate holds the parts of partner pairing and activity tracking that
//! do not touch the record store: invite code generation, weekly stats,
//! streaks, clap bucketing and share text.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take fetched history plus
//! an explicit `now` and return a value. This enables:
//! - Instant unit tests (no store, no async)
//! - Deterministic behavior (same history and `now` → same result)
//! - One timezone contract: the timezone of `now` is the viewer's local
//!   timezone, used for every calendar-day boundary
//!
//! Store reads and writes live in `fit-client`, which feeds the results of
//! its queries into these functions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activity;
pub mod claps;
pub mod clock;
pub mod invite;
pub mod share;

pub use activity::{streak, weekly_stats, WeeklyStats, DEFAULT_WEEKLY_GOAL};
pub use claps::{
    daily_claps, window_start, DailyClaps, DailyClapsEntry, DayClaps, DEFAULT_CLAP_WINDOW_DAYS,
};
pub use invite::{
    ByteSource, InviteCodeError, InviteCodeGenerator, OsRandom, DEFAULT_CODE_LENGTH,
    INVITE_ALPHABET, MAX_CODE_LENGTH, MIN_CODE_LENGTH,
};
pub use share::{ShareMessage, DEFAULT_APP_NAME};
