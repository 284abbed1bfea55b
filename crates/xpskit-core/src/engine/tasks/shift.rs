use crate::core::models::shift::ShiftSettings;
use crate::core::models::spectrum::Dataset;
use crate::engine::error::EngineError;
use crate::engine::gateway::Gateway;
use crate::engine::gateway::protocol::Shift;
use crate::engine::store::DatasetStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Applies charge-shift correction to every spectrum in the store.
///
/// Tags and their order are kept; both axes of every spectrum are replaced with what
/// the subsystem returns and the result is swapped into the store in one step.
///
/// # Errors
///
/// - [`EngineError::EmptyDataset`] if there is nothing to correct; the subsystem is
///   not called.
/// - [`EngineError::Shift`] if the correction call fails.
/// - [`EngineError::ShiftCountMismatch`] if the reply does not hold exactly one `x`
///   and one `y` array per spectrum. The store is left untouched.
#[instrument(skip_all, name = "shift_task")]
pub fn run(
    gateway: &Gateway,
    store: &DatasetStore,
    settings: &ShiftSettings,
) -> Result<Arc<Dataset>, EngineError> {
    let current = store.snapshot();
    if current.is_empty() {
        return Err(EngineError::EmptyDataset);
    }

    info!(
        center = settings.shift_peak_center,
        x_min = settings.x_min,
        x_max = settings.x_max,
        "Applying shift correction."
    );

    let shifted = gateway
        .call(&Shift {
            tags: current.tags(),
            x: current.x_arrays(),
            y: current.y_arrays(),
            x_min: settings.x_min,
            x_max: settings.x_max,
            center: settings.shift_peak_center,
        })
        .map_err(EngineError::Shift)?;

    let expected = current.len();
    for actual in [shifted.x.len(), shifted.y.len()] {
        if actual != expected {
            return Err(EngineError::ShiftCountMismatch { expected, actual });
        }
    }

    let corrected = current.with_axes(shifted.x, shifted.y)?;
    let corrected = store.replace(corrected);
    info!(spectra = corrected.len(), "Shift correction applied.");
    Ok(corrected)
}
