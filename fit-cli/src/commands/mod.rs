//! CLI command implementations.

use anyhow::{Context, Result};
use fit_client::{Config, Notice, Notifier, Severity};
use fit_store::SqliteStore;
use std::path::{Path, PathBuf};

use crate::config::{database_path, load_settings, ViewerConfig};

pub mod claps;
pub mod connect;
pub mod init;
pub mod log;
pub mod reconcile;
pub mod send;
pub mod share;
pub mod stats;
pub mod status;

/// Settings and store shared by every command.
pub struct Session {
    /// Directory holding the viewer file (and by default the database).
    pub data_dir: PathBuf,
    /// Loaded settings.
    pub config: Config,
    /// Opened record store.
    pub store: SqliteStore,
}

impl Session {
    /// Load settings and open the database.
    pub async fn open(
        data_dir: &Path,
        config_path: Option<&Path>,
        database: Option<&Path>,
    ) -> Result<Self> {
        let config = load_settings(data_dir, config_path)?;
        let db_path = database_path(data_dir, &config, database);
        tracing::debug!(path = %db_path.display(), "Opening database");
        let store = SqliteStore::new(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            store,
        })
    }

    /// The initialized viewer.
    pub async fn viewer(&self) -> Result<ViewerConfig> {
        ViewerConfig::load(&self.data_dir).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Session over a fresh database in `dir`.
    pub async fn session(dir: &Path) -> Session {
        Session::open(dir, None, None).await.unwrap()
    }

    /// Session with an initialized viewer named `name` in its own directory.
    pub async fn initialized(dir: &Path, name: &str, database: &Path) -> Session {
        let session = Session::open(dir, None, Some(database)).await.unwrap();
        super::init::run(&session, name).await.unwrap();
        session
    }
}

/// Prints notices to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => eprintln!("{}: {}", notice.title, notice.description),
            Severity::Success | Severity::Info => {
                println!("{}", notice.title);
                println!("  {}", notice.description);
            }
        }
    }
}

/// A failure whose notice has already been printed.
///
/// `main` exits non-zero on it without printing anything further.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("failure already reported")
    }
}

impl std::error::Error for Reported {}

/// Turn a failure notice into a command error.
pub fn fail(notice: Notice) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", notice.title, notice.description)
}
