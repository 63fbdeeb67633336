use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a forum store directory.
///
/// Controls where the snapshot lives, how it is written, and who the CLI
/// acts as when no user is given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File name of the JSON snapshot, relative to the store root.
    storage_file: String,

    /// Whether snapshots are pretty-printed.
    pub pretty: bool,

    /// The default acting user id.
    pub user_id: Option<String>,

    /// The default acting user's display name.
    pub user_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_file: default_storage_file(),
            pretty: true,
            user_id: None,
            user_name: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The snapshot file name, relative to the store root.
    #[must_use]
    pub fn storage_file(&self) -> &str {
        &self.storage_file
    }

    /// Sets the snapshot file name.
    ///
    /// Blank names are ignored and return `false`.
    pub fn set_storage_file(&mut self, name: String) -> bool {
        if name.trim().is_empty() {
            false
        } else {
            self.storage_file = name;
            true
        }
    }
}

fn default_storage_file() -> String {
    "forum-storage.json".to_string()
}

const fn default_pretty() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_storage_file")]
        storage_file: String,

        #[serde(default = "default_pretty")]
        pretty: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                storage_file,
                pretty,
                user_id,
                user_name,
            } => Self {
                storage_file,
                pretty,
                user_id,
                user_name,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            storage_file: config.storage_file,
            pretty: config.pretty,
            user_id: config.user_id,
            user_name: config.user_name,
        }
    }
}
