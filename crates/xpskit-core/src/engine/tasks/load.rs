use crate::core::models::spectrum::Dataset;
use crate::engine::error::EngineError;
use crate::engine::gateway::Gateway;
use crate::engine::gateway::protocol::LoadAllSpe;
use crate::engine::store::DatasetStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Loads a raw instrument file into the store.
///
/// The store is replaced only once the subsystem has answered, so a rejected file
/// leaves the previous dataset in place. A file that parses but holds no spectra
/// empties the store and is reported as [`EngineError::NoData`].
///
/// # Errors
///
/// Returns [`EngineError::Load`] carrying the subsystem's message verbatim when the
/// call fails, [`EngineError::Dataset`] when the reply's collections are misaligned,
/// or [`EngineError::NoData`] when the file holds no spectra.
#[instrument(skip_all, name = "load_task", fields(path = %path.display()))]
pub fn run(gateway: &Gateway, store: &DatasetStore, path: &Path) -> Result<Arc<Dataset>, EngineError> {
    let display_path = path.to_string_lossy().to_string();
    info!("Loading spectra.");

    let loaded = gateway
        .call(&LoadAllSpe {
            path: display_path.clone(),
        })
        .map_err(|source| EngineError::Load {
            path: display_path.clone(),
            source,
        })?;

    let dataset = Dataset::from_parallel(loaded.tags, loaded.x, loaded.y)?;
    let dataset = store.replace(dataset);

    if dataset.is_empty() {
        return Err(EngineError::NoData { path: display_path });
    }

    info!(spectra = dataset.len(), tags = ?dataset.tags(), "Spectra loaded.");
    Ok(dataset)
}
