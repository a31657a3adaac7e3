//! JSON state file backing the in-memory store between CLI runs.

use std::path::Path;

use bughunter_engine::default_catalog;
use bughunter_storage::{MemoryStore, StoreState};

/// Load the store from `path`. A missing file starts a fresh store seeded with
/// the default achievement catalog.
pub(crate) fn load_store(path: &Path) -> Result<MemoryStore, String> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no state file, starting fresh");
        return Ok(MemoryStore::with_catalog(default_catalog()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let state: StoreState = serde_json::from_str(&content)
        .map_err(|e| format!("invalid state file '{}': {}", path.display(), e))?;
    Ok(MemoryStore::from_state(state))
}

/// Write the full store contents back to `path`.
pub(crate) fn save_store(store: &MemoryStore, path: &Path) -> Result<(), String> {
    let state = store.to_state().map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&state)
        .map_err(|e| format!("could not serialize state: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("could not write '{}': {}", path.display(), e))
}
