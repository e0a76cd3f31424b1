//! Settings file storage.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::Settings;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Get the settings file path.
pub fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "geode").context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.json"))
}

/// Load settings from disk. A missing file means defaults.
pub fn load() -> Result<Settings> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(Settings::default());
    }

    let json = fs::read_to_string(&path).context("Failed to read config file")?;
    let settings = serde_json::from_str(&json)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Save settings to disk.
pub fn save(settings: &Settings) -> Result<PathBuf> {
    let path = config_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, &json).context("Failed to write config file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}
