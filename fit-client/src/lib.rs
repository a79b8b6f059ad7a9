//! # fit-client
//!
//! Services that applications call to pair partners, log workouts and
//! exchange encouragement.
//!
//! Every service takes the viewer's [`UserId`](fit_types::UserId)
//! explicitly and reads through a [`RecordStore`](fit_store::RecordStore)
//! on each call; nothing is cached between calls. Aggregation is delegated
//! to the pure functions in `fit-core`.
//!
//! ```text
//! CLI / UI → PairingManager, ProfileService, ActivityService,
//!            EncouragementService → RecordStore → SQLite / memory
//!                       ↓
//!               fit-core (pure aggregation)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use fit_client::{Config, PairingManager};
//! use fit_store::SqliteStore;
//!
//! let config = Config::from_file("fittogether.toml".as_ref())?;
//! let store = SqliteStore::new(&config.storage.database).await?;
//! let pairing = PairingManager::new(store, &config);
//! let partner = pairing.connect(&viewer, "abcd2345").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod activity;
pub mod config;
pub mod encouragement;
pub mod error;
pub mod notify;
pub mod pairing;
pub mod profile;

pub use activity::{ActivityService, ActivitySummary, LogWorkout};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_FILE};
pub use encouragement::{Encouragement, EncouragementService, SendMessage, SentMessage};
pub use error::{ClientError, ClientResult, PairingError};
pub use notify::{
    Notice, Notifier, NullNotifier, RecordingNotifier, Severity, ShareError, ShareSurface,
};
pub use pairing::{PairedPartner, PairingManager, ReconcileReport};
pub use profile::{ProfileService, ProfileView};
