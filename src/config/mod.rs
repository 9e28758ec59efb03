// src/config/mod.rs
// =============================================================================
// This module persists the one piece of durable state we have: the server
// URL the user configured.
//
// Storage format:
// - A single JSON object: {"serverUrl": "<what the user typed>"}
// - Lives at <platform config dir>/stream-sentry/config.json
// - The *raw* input is stored, not the normalized form, so the user sees
//   their own string back when they look at the configuration
//
// Lifecycle:
// - Written only after the input passed validation
// - Removed entirely on explicit reset
// - Read back unconditionally at startup, without re-validation
//
// Rust concepts:
// - PathBuf: Owned filesystem paths
// - serde derive: The struct maps 1:1 onto the JSON on disk
// =============================================================================

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// The persisted configuration, exactly as serialized to disk
//
// One key, no schema version. The value is the last raw URL that passed
// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(rename = "serverUrl")]
    pub server_url: String,
}

// Loads, saves, and clears the persisted configuration at a fixed path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the platform default location
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine the platform config directory"))?;

        Ok(Self {
            path: base.join("stream-sentry").join("config.json"),
        })
    }

    /// Store at an explicit path (used by tests)
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    // Reads the persisted server URL
    //
    // A missing file simply means nothing was configured yet - that is
    // the normal first-run state, not an error. A file that exists but
    // cannot be read or parsed *is* an error, with context attached.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file: {}", self.path.display()))?;

        let config: PersistedConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed config file: {}", self.path.display()))?;

        Ok(Some(config.server_url))
    }

    // Persists the raw server URL, overwriting any previous value
    pub fn save(&self, raw_url: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let config = PersistedConfig {
            server_url: raw_url.to_string(),
        };

        let contents = serde_json::to_string_pretty(&config)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;

        Ok(())
    }

    // Removes the persisted configuration
    //
    // Clearing an already-clear configuration is fine - the end state is
    // identical, so no error.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove config file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::at(dir.path().join("stream-sentry").join("config.json"))
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_roundtrips_raw_input() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        // The raw string is stored as typed - trailing slash and all
        store.save("https://host.example/").unwrap();
        assert_eq!(
            store.load().unwrap(),
            Some("https://host.example/".to_string())
        );
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save("old.example").unwrap();
        store.save("new.example").unwrap();
        assert_eq!(store.load().unwrap(), Some("new.example".to_string()));
    }

    #[test]
    fn test_clear_removes_value() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save("host.example").unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing again is a no-op, not an error
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let store = ConfigStore::at(path);
        assert!(store.load().is_err());
    }
}
