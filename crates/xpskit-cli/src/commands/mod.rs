pub mod analyze;
pub mod peaks;
pub mod rsf;
pub mod settings;
pub mod shift;

use crate::config::RunConfig;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use xpskit::core::models::spectrum::Dataset;
use xpskit::core::settings::{SettingsResolver, SettingsStore};
use xpskit::engine::gateway::InitMode;
use xpskit::workflows::session::AnalysisSession;

/// The current user's settings, without starting the numerical subsystem.
fn settings_store() -> Result<SettingsStore> {
    Ok(SettingsStore::new(SettingsResolver::from_environment()?))
}

/// Starts the subsystem, loads `input` and applies shift correction when `shift` is set.
fn open_dataset(
    session: &AnalysisSession,
    config: &RunConfig,
    input: &Path,
    shift: bool,
) -> Result<Arc<Dataset>> {
    session.initialize_subsystem(config.interpreter.as_deref(), InitMode::Interactive)?;

    info!("Loading spectra from {:?}", input);
    let dataset = session.load(input)?;
    info!(spectra = dataset.len(), "Dataset loaded: {:?}", dataset.tags());

    if !shift {
        return Ok(dataset);
    }
    info!(
        center = config.shift.shift_peak_center,
        x_min = config.shift.x_min,
        x_max = config.shift.x_max,
        "Applying charge-shift correction."
    );
    Ok(session.apply_shift(&config.shift)?)
}
