//! Typed requests and responses for each numerical-subsystem routine.
//!
//! Arguments are encoded positionally in the order the routines declare them. Replies
//! are decoded and shape-checked here so loosely typed values never reach the engine:
//! numbers arrive as `Option<f64>` because the transport maps non-finite floats to
//! `null`, and each call decides whether such a value is an error or a zero.

use super::subsystem::Procedure;
use crate::core::models::peaks::PeakModel;
use crate::core::models::rsf::ReferenceFactor;
use crate::engine::error::SubsystemError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A typed call to one subsystem routine.
pub trait Call {
    type Output;

    const PROCEDURE: Procedure;

    fn args(&self) -> Vec<Value>;

    fn decode(&self, value: Value) -> Result<Self::Output, SubsystemError>;
}

fn malformed(procedure: Procedure, reason: impl Into<String>) -> SubsystemError {
    SubsystemError::MalformedResponse {
        function: procedure.function(),
        reason: reason.into(),
    }
}

fn parse<T: DeserializeOwned>(
    procedure: Procedure,
    value: Value,
) -> Result<T, SubsystemError> {
    serde_json::from_value(value).map_err(|e| malformed(procedure, e.to_string()))
}

fn finite_series(
    procedure: Procedure,
    what: &str,
    values: Vec<Option<f64>>,
) -> Result<Vec<f64>, SubsystemError> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(malformed(
                procedure,
                format!("{what} contains a non-finite value at index {i}"),
            )),
        })
        .collect()
}

/// `load_allspe(path)`.
#[derive(Debug, Clone)]
pub struct LoadAllSpe {
    pub path: String,
}

/// Three parallel collections as produced by the loader routine.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSpectra {
    pub tags: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
}

type RawSeries = Vec<Vec<Option<f64>>>;

impl Call for LoadAllSpe {
    type Output = LoadedSpectra;

    const PROCEDURE: Procedure = Procedure::LoadAllSpe;

    fn args(&self) -> Vec<Value> {
        vec![json!(self.path)]
    }

    fn decode(&self, value: Value) -> Result<LoadedSpectra, SubsystemError> {
        let (tags, x, y): (Vec<String>, RawSeries, RawSeries) = parse(Self::PROCEDURE, value)?;
        let x = x
            .into_iter()
            .map(|series| finite_series(Self::PROCEDURE, "x", series))
            .collect::<Result<_, _>>()?;
        let y = y
            .into_iter()
            .map(|series| finite_series(Self::PROCEDURE, "y", series))
            .collect::<Result<_, _>>()?;
        Ok(LoadedSpectra { tags, x, y })
    }
}

/// `shift(tags, x, y, x_min, x_max, standard)`.
#[derive(Debug, Clone)]
pub struct Shift<'a> {
    pub tags: Vec<&'a str>,
    pub x: Vec<&'a [f64]>,
    pub y: Vec<&'a [f64]>,
    pub x_min: f64,
    pub x_max: f64,
    pub center: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftedAxes {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
}

impl Call for Shift<'_> {
    type Output = ShiftedAxes;

    const PROCEDURE: Procedure = Procedure::Shift;

    fn args(&self) -> Vec<Value> {
        vec![
            json!(self.tags),
            json!(self.x),
            json!(self.y),
            json!(self.x_min),
            json!(self.x_max),
            json!(self.center),
        ]
    }

    /// A bare number is the routine's signal that no reference peak was found in the
    /// window; it is reported as a raised error rather than a shape violation.
    fn decode(&self, value: Value) -> Result<ShiftedAxes, SubsystemError> {
        if value.is_number() {
            return Err(SubsystemError::Raised {
                module: Self::PROCEDURE.module(),
                function: Self::PROCEDURE.function(),
                message: format!(
                    "reference peak not found in the {}-{} eV window",
                    self.x_min, self.x_max
                ),
            });
        }
        let (x, y): (RawSeries, RawSeries) = parse(Self::PROCEDURE, value)?;
        let x = x
            .into_iter()
            .map(|series| finite_series(Self::PROCEDURE, "x", series))
            .collect::<Result<_, _>>()?;
        let y = y
            .into_iter()
            .map(|series| finite_series(Self::PROCEDURE, "y", series))
            .collect::<Result<_, _>>()?;
        Ok(ShiftedAxes { x, y })
    }
}

/// `atomic_percent(x, y, tags, rsf_list)`.
#[derive(Debug, Clone)]
pub struct AtomicPercent<'a> {
    pub x: Vec<&'a [f64]>,
    pub y: Vec<&'a [f64]>,
    pub tags: Vec<&'a str>,
    pub factors: &'a [ReferenceFactor],
}

impl Call for AtomicPercent<'_> {
    type Output = Vec<f64>;

    const PROCEDURE: Procedure = Procedure::AtomicPercent;

    fn args(&self) -> Vec<Value> {
        vec![
            json!(self.x),
            json!(self.y),
            json!(self.tags),
            json!(self.factors),
        ]
    }

    /// Non-finite entries (sent as `null`) become `0.0`; the count must match the
    /// number of spectra sent.
    fn decode(&self, value: Value) -> Result<Vec<f64>, SubsystemError> {
        let raw: Vec<Option<f64>> = parse(Self::PROCEDURE, value)?;
        if raw.len() != self.tags.len() {
            return Err(malformed(
                Self::PROCEDURE,
                format!("expected {} values, got {}", self.tags.len(), raw.len()),
            ));
        }
        Ok(raw
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect())
    }
}

/// `shirley_baseline(x, y)`; only the baseline itself is kept from the reply.
#[derive(Debug, Clone)]
pub struct ShirleyBaseline<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
}

impl Call for ShirleyBaseline<'_> {
    type Output = Vec<f64>;

    const PROCEDURE: Procedure = Procedure::ShirleyBaseline;

    fn args(&self) -> Vec<Value> {
        vec![json!(self.x), json!(self.y)]
    }

    fn decode(&self, value: Value) -> Result<Vec<f64>, SubsystemError> {
        let first = match value {
            Value::Array(mut items) if items.first().is_some_and(Value::is_array) => {
                items.swap_remove(0)
            }
            other => other,
        };
        let raw: Vec<Option<f64>> = parse(Self::PROCEDURE, first)?;
        finite_series(Self::PROCEDURE, "baseline", raw)
    }
}

/// A peak model as the fitting routine reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitPeakConfig<'a> {
    pub name: &'a str,
    pub position: f64,
    pub fwhm: f64,
    pub level: &'a str,
    pub center_error: f64,
    pub fwhm_error: f64,
}

impl<'a> From<&'a PeakModel> for FitPeakConfig<'a> {
    fn from(model: &'a PeakModel) -> Self {
        Self {
            name: &model.name,
            position: model.center,
            fwhm: model.fwhm,
            level: &model.level,
            center_error: model.center_error,
            fwhm_error: model.fwhm_error,
        }
    }
}

/// `perform_fitting(x, y, config, verbose)`.
#[derive(Debug, Clone)]
pub struct PerformFitting<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub peaks: Vec<FitPeakConfig<'a>>,
    pub verbose: bool,
}

/// One fitted component as reported; finiteness is checked by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawComponent {
    pub name: String,
    pub center: Option<f64>,
    pub fwhm: Option<f64>,
    pub area: Option<f64>,
    #[serde(default)]
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitReply {
    Converged(Vec<RawComponent>),
    NotConverged,
}

impl Call for PerformFitting<'_> {
    type Output = FitReply;

    const PROCEDURE: Procedure = Procedure::PerformFitting;

    fn args(&self) -> Vec<Value> {
        vec![
            json!(self.x),
            json!(self.y),
            json!(self.peaks),
            json!(self.verbose),
        ]
    }

    fn decode(&self, value: Value) -> Result<FitReply, SubsystemError> {
        let (peaks, _envelope): (Option<Vec<RawComponent>>, Value) =
            parse(Self::PROCEDURE, value)?;
        Ok(match peaks {
            Some(peaks) => FitReply::Converged(peaks),
            None => FitReply::NotConverged,
        })
    }
}
