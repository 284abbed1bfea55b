use crate::core::models::rsf::ReferenceFactorTable;
use crate::core::models::spectrum::Dataset;
use crate::engine::error::EngineError;
use crate::engine::gateway::Gateway;
use crate::engine::gateway::protocol::AtomicPercent;
use tracing::{debug, info, instrument};

/// Computes one atomic percentage per spectrum, index-aligned with the dataset.
///
/// Without a reference-factor table (or with an empty one) every value is `0.0` and
/// the subsystem is not called. Non-finite values from the subsystem are returned as
/// `0.0`.
///
/// # Errors
///
/// Returns [`EngineError::Quantification`] if the call fails or returns the wrong
/// number of values.
#[instrument(skip_all, name = "quantify_task")]
pub fn run(
    gateway: &Gateway,
    dataset: &Dataset,
    factors: Option<&ReferenceFactorTable>,
) -> Result<Vec<f64>, EngineError> {
    let Some(factors) = factors.filter(|table| !table.is_empty()) else {
        debug!("No reference factors configured; atomic percentages are all zero.");
        return Ok(vec![0.0; dataset.len()]);
    };
    if dataset.is_empty() {
        return Ok(Vec::new());
    }

    let values = gateway
        .call(&AtomicPercent {
            x: dataset.x_arrays(),
            y: dataset.y_arrays(),
            tags: dataset.tags(),
            factors: factors.rows(),
        })
        .map_err(EngineError::Quantification)?;

    info!(values = ?values, "Atomic percentages computed.");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::spectrum::Spectrum;
    use crate::engine::gateway::{Procedure, ScriptedSubsystem};
    use serde_json::json;

    fn three_spectra() -> Dataset {
        Dataset::new(
            ["Su1s", "C1s", "O1s"]
                .into_iter()
                .map(|tag| Spectrum::new(tag, vec![1.0, 2.0], vec![3.0, 4.0]).unwrap())
                .collect(),
        )
    }

    #[test]
    fn absent_or_empty_table_gives_zeros_without_a_call() {
        let (gateway, history) = ScriptedSubsystem::new().into_ready_gateway().unwrap();
        let dataset = three_spectra();

        assert_eq!(run(&gateway, &dataset, None).unwrap(), vec![0.0; 3]);
        assert_eq!(
            run(&gateway, &dataset, Some(&ReferenceFactorTable::default())).unwrap(),
            vec![0.0; 3]
        );
        assert_eq!(history.calls_to(Procedure::AtomicPercent), 0);
    }

    #[test]
    fn non_finite_values_become_zero() {
        let (gateway, history) = ScriptedSubsystem::new()
            .respond(Procedure::AtomicPercent, json!([null, 35.5, 64.5]))
            .into_ready_gateway().unwrap();

        let values = run(&gateway, &three_spectra(), Some(&ReferenceFactorTable::seed())).unwrap();

        assert_eq!(values, vec![0.0, 35.5, 64.5]);
        assert!(values.iter().all(|v| v.is_finite()));
        let args = history.last_args(Procedure::AtomicPercent).unwrap();
        assert_eq!(args[2], json!(["Su1s", "C1s", "O1s"]));
        assert_eq!(args[3][0], json!({"level": "C1s", "rsf": 0.314}));
    }

    #[test]
    fn failing_call_is_surfaced() {
        let (gateway, _) = ScriptedSubsystem::new()
            .fail(Procedure::AtomicPercent, "ZeroDivisionError")
            .into_ready_gateway().unwrap();
        let err = run(&gateway, &three_spectra(), Some(&ReferenceFactorTable::seed())).unwrap_err();
        assert!(matches!(err, EngineError::Quantification(_)));
    }
}
