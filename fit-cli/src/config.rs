//! Local viewer identity and settings resolution for the CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fit_client::{Config, DEFAULT_CONFIG_FILE};
use fit_types::UserId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const VIEWER_FILE: &str = "viewer.json";

/// The account this CLI acts as, stored in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// The viewer's user id.
    pub user_id: UserId,
    /// Display name given at init.
    pub display_name: String,
    /// When the viewer was initialized.
    pub created_at: DateTime<Utc>,
}

impl ViewerConfig {
    /// Create a new viewer with a fresh user id.
    pub fn new(name: &str) -> Self {
        Self {
            user_id: UserId::new(),
            display_name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Load the viewer from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(VIEWER_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Not initialized. Run 'fittogether init --name <name>' first.")?;
        serde_json::from_str(&contents).context("Invalid viewer file")
    }

    /// Save the viewer to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(VIEWER_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save viewer file")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if a viewer exists in the directory.
    pub fn exists(data_dir: &Path) -> bool {
        data_dir.join(VIEWER_FILE).exists()
    }

    /// Path of the viewer file inside `data_dir`.
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(VIEWER_FILE)
    }
}

/// Load settings: an explicit `--config` file must exist; otherwise a
/// `fittogether.toml` in the data directory is used when present.
pub fn load_settings(data_dir: &Path, explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::from_file(path)?,
        None => {
            let candidate = data_dir.join(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                Config::from_file(&candidate)?
            } else {
                Config::default()
            }
        }
    };
    Ok(config)
}

/// Database location: `--database` wins, then the configured path,
/// resolved against the data directory when relative.
pub fn database_path(data_dir: &Path, config: &Config, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None if config.storage.database.is_absolute() => config.storage.database.clone(),
        None => data_dir.join(&config.storage.database),
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
#[allow(unused_variables)]
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    Ok(())
}
