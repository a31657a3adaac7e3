//! Configuration file format for `bughunter`.
//!
//! Every key is optional; a missing file means all defaults.
//!
//! # Example
//!
//! ```toml
//! [engine]
//! time_bonus_seconds = 120
//! max_conflict_retries = 3
//!
//! [store]
//! state_file = "bughunter-state.json"
//! ```

use std::path::{Path, PathBuf};

use bughunter_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "bughunter.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub engine: EngineConfig,
    pub store: StoreConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoreConfig {
    /// JSON file holding the catalog, progress, and awards.
    pub state_file: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("bughunter-state.json"),
        }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Load configuration.
///
/// With `explicit` set, the file must exist. Otherwise `bughunter.toml` is
/// read if present and defaults are used if not. A file that exists but does
/// not parse is always an error.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                read_config(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}
