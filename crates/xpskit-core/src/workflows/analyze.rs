use crate::core::models::peaks::PeakModelTable;
use crate::core::models::results::{AnalysisReport, FitOutcome, SkipReason, SpectrumAnalysis};
use crate::core::models::rsf::ReferenceFactorTable;
use crate::core::models::spectrum::{Dataset, Spectrum};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use crate::engine::tasks;
use tracing::{info, instrument, warn};

/// Quantifies every spectrum and fits the eligible ones.
///
/// Every spectrum yields one [`SpectrumAnalysis`], in dataset order. A spectrum is
/// fitted only when fitting is enabled, it is not the survey scan at index 0, its tag
/// is not excluded, a peak-model table exists and at least one model's level equals
/// its tag. A failure while fitting one spectrum is logged and recorded as
/// [`SkipReason::Failed`]; it never aborts the run.
///
/// # Arguments
///
/// * `context` - Gateway, progress reporter and analysis options.
/// * `dataset` - The spectra to analyse.
/// * `peak_models` - The saved peak-model table; `None` disables fitting.
/// * `factors` - The saved reference-factor table; `None` gives zero atomic percents.
///
/// # Errors
///
/// Returns [`EngineError::Quantification`] if the atomic-percent call fails.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    context: &AnalysisContext,
    dataset: &Dataset,
    peak_models: Option<&PeakModelTable>,
    factors: Option<&ReferenceFactorTable>,
) -> Result<AnalysisReport, EngineError> {
    info!(spectra = dataset.len(), "Starting analysis.");

    let atomic_percents = context.reporter.phase("Quantification", || {
        tasks::quantify::run(context.gateway, dataset, factors)
    })?;

    context.reporter.report(Progress::PhaseStart {
        name: "Peak Fitting",
    });
    context.reporter.report(Progress::TaskStart {
        total_steps: dataset.len() as u64,
    });

    let mut spectra = Vec::with_capacity(dataset.len());
    for (index, (spectrum, &atomic_percent)) in dataset.iter().zip(&atomic_percents).enumerate() {
        let fit = fit_outcome(context, index, spectrum, peak_models);
        spectra.push(SpectrumAnalysis {
            tag: spectrum.tag().to_string(),
            atomic_percent,
            fit,
        });
        context.reporter.report(Progress::TaskIncrement);
    }

    context.reporter.report(Progress::TaskFinish);
    context.reporter.report(Progress::PhaseFinish);

    let fitted = spectra
        .iter()
        .filter(|s| matches!(s.fit, FitOutcome::Fitted(_)))
        .count();
    info!(
        spectra = spectra.len(),
        fitted, "Analysis complete."
    );
    Ok(AnalysisReport { spectra })
}

fn fit_outcome(
    context: &AnalysisContext,
    index: usize,
    spectrum: &Spectrum,
    peak_models: Option<&PeakModelTable>,
) -> FitOutcome {
    if context.config.skip_fitting {
        return FitOutcome::Skipped(SkipReason::Disabled);
    }
    if index == 0 {
        return FitOutcome::Skipped(SkipReason::Survey);
    }
    if context.config.is_excluded(spectrum.tag()) {
        return FitOutcome::Skipped(SkipReason::ExcludedTag);
    }
    let Some(table) = peak_models else {
        return FitOutcome::Skipped(SkipReason::NoPeakModelTable);
    };
    let models = table.for_level(spectrum.tag());
    if models.is_empty() {
        return FitOutcome::Skipped(SkipReason::NoMatchingModels);
    }

    match tasks::fit::fit_spectrum(context.gateway, spectrum, &models) {
        Ok(components) => {
            info!(
                tag = spectrum.tag(),
                components = components.len(),
                "Spectrum fitted."
            );
            FitOutcome::Fitted(components)
        }
        Err(e) => {
            warn!(tag = spectrum.tag(), "Skipping spectrum: {}", e);
            context
                .reporter
                .report(Progress::Message(format!("{}: {}", spectrum.tag(), e)));
            FitOutcome::Skipped(SkipReason::Failed(e.to_string()))
        }
    }
}
