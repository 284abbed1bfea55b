use crate::core::models::peaks::PeakModel;
use crate::core::models::results::FittedComponent;
use crate::core::models::spectrum::Spectrum;
use crate::engine::error::FitError;
use crate::engine::gateway::Gateway;
use crate::engine::gateway::protocol::{
    FitPeakConfig, FitReply, PerformFitting, RawComponent, ShirleyBaseline,
};
use tracing::debug;

/// Removes the background from one spectrum and fits the given peak models to it.
///
/// # Arguments
///
/// * `gateway` - The numerical-subsystem gateway.
/// * `spectrum` - The spectrum to fit; its raw intensities are not modified.
/// * `models` - Peak models whose level matches the spectrum's tag.
///
/// # Return
///
/// The fitted components in the order the fitting routine reported them.
///
/// # Errors
///
/// Any [`FitError`]; callers are expected to contain it to this spectrum.
pub fn fit_spectrum(
    gateway: &Gateway,
    spectrum: &Spectrum,
    models: &[&PeakModel],
) -> Result<Vec<FittedComponent>, FitError> {
    let baseline = gateway
        .call(&ShirleyBaseline {
            x: spectrum.x(),
            y: spectrum.y(),
        })
        .map_err(FitError::Baseline)?;

    let signal = subtract_background(spectrum.y(), &baseline)?;
    debug!(tag = spectrum.tag(), points = signal.len(), "Background removed.");

    let reply = gateway
        .call(&PerformFitting {
            x: spectrum.x(),
            y: &signal,
            peaks: models.iter().map(|model| FitPeakConfig::from(*model)).collect(),
            verbose: false,
        })
        .map_err(FitError::Fitting)?;

    match reply {
        FitReply::NotConverged => Err(FitError::NotConverged),
        FitReply::Converged(components) => components.into_iter().map(into_component).collect(),
    }
}

/// `y - baseline`, clamped at zero.
fn subtract_background(y: &[f64], baseline: &[f64]) -> Result<Vec<f64>, FitError> {
    if baseline.len() != y.len() {
        return Err(FitError::BaselineLength {
            baseline: baseline.len(),
            spectrum: y.len(),
        });
    }
    Ok(y.iter()
        .zip(baseline)
        .map(|(y, b)| (y - b).max(0.0))
        .collect())
}

fn into_component(raw: RawComponent) -> Result<FittedComponent, FitError> {
    let finite = |value: Option<f64>, field: &'static str| match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(FitError::NonFinite {
            name: raw.name.clone(),
            field,
        }),
    };
    Ok(FittedComponent {
        center: finite(raw.center, "center")?,
        fwhm: finite(raw.fwhm, "fwhm")?,
        area: finite(raw.area, "area")?,
        ratio: finite(raw.ratio, "ratio")?,
        name: raw.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gateway::{Procedure, ScriptedSubsystem};
    use serde_json::json;

    fn c1s() -> Spectrum {
        Spectrum::new("C1s", vec![283.0, 284.0, 285.0], vec![10.0, 50.0, 12.0]).unwrap()
    }

    fn model() -> PeakModel {
        PeakModel::new("1", "C1s", "C-C", 284.0, 0.5, 1.0, 0.3)
    }

    #[test]
    fn background_is_subtracted_and_clamped_before_fitting() {
        let (gateway, history) = ScriptedSubsystem::new()
            .respond(Procedure::ShirleyBaseline, json!([[11.0, 9.0, 11.0], 283.0, 285.0]))
            .respond(
                Procedure::PerformFitting,
                json!([[{"name": "C-C", "center": 284.02, "fwhm": 1.1, "area": 41.0, "ratio": 100.0}], [0.0, 41.0, 1.0]]),
            )
            .into_ready_gateway().unwrap();
        let model = model();

        let components = fit_spectrum(&gateway, &c1s(), &[&model]).unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "C-C");
        assert_eq!(components[0].area, 41.0);

        let args = history.last_args(Procedure::PerformFitting).unwrap();
        assert_eq!(args[1], json!([0.0, 41.0, 1.0]));
        assert_eq!(args[2][0]["position"], json!(284.0));
        assert_eq!(args[3], json!(false));
    }

    #[test]
    fn baseline_of_wrong_length_is_rejected() {
        let (gateway, history) = ScriptedSubsystem::new()
            .respond(Procedure::ShirleyBaseline, json!([[1.0, 1.0]]))
            .into_ready_gateway().unwrap();
        let model = model();

        let err = fit_spectrum(&gateway, &c1s(), &[&model]).unwrap_err();
        assert!(matches!(
            err,
            FitError::BaselineLength {
                baseline: 2,
                spectrum: 3
            }
        ));
        assert_eq!(history.calls_to(Procedure::PerformFitting), 0);
    }

    #[test]
    fn null_pair_is_not_converged() {
        let (gateway, _) = ScriptedSubsystem::new()
            .respond(Procedure::ShirleyBaseline, json!([[0.0, 0.0, 0.0]]))
            .respond(Procedure::PerformFitting, json!([null, null]))
            .into_ready_gateway().unwrap();
        let model = model();

        let err = fit_spectrum(&gateway, &c1s(), &[&model]).unwrap_err();
        assert!(matches!(err, FitError::NotConverged));
    }

    #[test]
    fn non_finite_component_value_is_rejected() {
        let (gateway, _) = ScriptedSubsystem::new()
            .respond(Procedure::ShirleyBaseline, json!([[0.0, 0.0, 0.0]]))
            .respond(
                Procedure::PerformFitting,
                json!([[{"name": "C-C", "center": 284.0, "fwhm": null, "area": 1.0, "ratio": 100.0}], null]),
            )
            .into_ready_gateway().unwrap();
        let model = model();

        let err = fit_spectrum(&gateway, &c1s(), &[&model]).unwrap_err();
        assert!(matches!(err, FitError::NonFinite { field: "fwhm", .. }));
    }

    #[test]
    fn subtract_background_clamps_negative_values() {
        assert_eq!(
            subtract_background(&[1.0, 5.0], &[2.0, 1.0]).unwrap(),
            vec![0.0, 4.0]
        );
    }
}
