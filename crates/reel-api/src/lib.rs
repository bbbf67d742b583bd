pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;

use reel_store::{JsonFileLoader, Loader, MemoryStore, NoopLoader, StoreError};

use crate::config::Config;

/// Load the collection named by `config`, or start empty when no data
/// file is configured.
pub fn open_store(config: &Config) -> Result<MemoryStore, StoreError> {
    match &config.data_path {
        Some(path) => MemoryStore::from_loader(&JsonFileLoader::new(path)),
        None => {
            tracing::warn!("REEL_DATA_PATH not set; starting with an empty collection");
            MemoryStore::from_loader(&NoopLoader)
        }
    }
}

/// Re-read the data file and swap it in. In-flight queries finish on the old
/// snapshot; a failed read leaves the current collection untouched.
pub fn reload_store(store: &MemoryStore, config: &Config) -> Result<usize, StoreError> {
    let Some(path) = &config.data_path else {
        return Ok(store.len());
    };
    let docs = JsonFileLoader::new(path)
        .load()?
        .collect::<Result<Vec<_>, _>>()?;
    let loaded = docs.len();
    store.replace(docs);
    tracing::info!(documents = loaded, path = %path.display(), "reloaded collection");
    Ok(loaded)
}
