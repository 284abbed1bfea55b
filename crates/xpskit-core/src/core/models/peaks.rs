use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CENTER_ERROR: f64 = 0.5;
const DEFAULT_FWHM: f64 = 1.0;
const DEFAULT_FWHM_ERROR: f64 = 0.3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "Peak model {id} has a non-physical center ({center}) or FWHM ({fwhm}); both must be greater than zero (level: '{level}', name: '{name}')"
    )]
    NonPhysical {
        id: String,
        level: String,
        name: String,
        center: f64,
        fwhm: f64,
    },
}

/// An expected spectral component used to seed and constrain fitting.
///
/// Field names on disk follow the existing `peakfit.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakModel {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub center: f64,
    #[serde(default = "default_center_error")]
    pub center_error: f64,
    #[serde(rename = "FWHM", default = "default_fwhm")]
    pub fwhm: f64,
    #[serde(rename = "FWHM_error", default = "default_fwhm_error")]
    pub fwhm_error: f64,
}

fn default_id() -> String {
    "0".to_string()
}

fn default_center_error() -> f64 {
    DEFAULT_CENTER_ERROR
}

fn default_fwhm() -> f64 {
    DEFAULT_FWHM
}

fn default_fwhm_error() -> f64 {
    DEFAULT_FWHM_ERROR
}

impl PeakModel {
    pub fn new(
        id: impl Into<String>,
        level: impl Into<String>,
        name: impl Into<String>,
        center: f64,
        center_error: f64,
        fwhm: f64,
        fwhm_error: f64,
    ) -> Self {
        Self {
            id: id.into(),
            level: level.into(),
            name: name.into(),
            center,
            center_error,
            fwhm,
            fwhm_error,
        }
    }

    /// A row is blank when neither its level nor its name carries any text.
    pub fn is_blank(&self) -> bool {
        self.level.trim().is_empty() && self.name.trim().is_empty()
    }

    /// Checks the physical invariant for a non-blank row.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonPhysical`] when the row is named but its center
    /// or FWHM is zero, negative or not a finite number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_blank() || (is_positive(self.center) && is_positive(self.fwhm)) {
            return Ok(());
        }
        Err(ValidationError::NonPhysical {
            id: self.id.clone(),
            level: self.level.clone(),
            name: self.name.clone(),
            center: self.center,
            fwhm: self.fwhm,
        })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// The ordered peak-model table, grouped by `level` at lookup time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeakModelTable {
    rows: Vec<PeakModel>,
}

impl PeakModelTable {
    pub fn new(rows: Vec<PeakModel>) -> Self {
        Self { rows }
    }

    /// Built-in example rows for common core lines, offered when no table exists yet.
    pub fn seed() -> Self {
        let rows = [
            ("C1s", "C-C", 284.8, 0.5, 1.0, 0.3),
            ("C1s", "C-O", 286.3, 0.8, 1.2, 0.4),
            ("C1s", "C=O", 288.0, 0.8, 1.2, 0.4),
            ("O1s", "Cu-O", 529.8, 0.6, 1.1, 0.3),
            ("O1s", "O-H", 531.5, 0.8, 1.3, 0.4),
            ("O1s", "C-O", 533.0, 0.8, 1.3, 0.4),
            ("Cu2p3", "Cu2O", 932.6, 0.4, 1.1, 0.3),
            ("Cu2p3", "Cu", 932.7, 0.4, 1.1, 0.3),
            ("Cu2p3", "CuO", 933.8, 0.8, 1.8, 0.6),
            ("Cu2p3", "Cu(OH)2", 935.0, 0.8, 1.8, 0.6),
        ];

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, (level, name, center, center_error, fwhm, fwhm_error))| {
                PeakModel::new(
                    (i + 1).to_string(),
                    level,
                    name,
                    center,
                    center_error,
                    fwhm,
                    fwhm_error,
                )
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[PeakModel] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Models whose `level` equals the given spectrum tag, in table order.
    pub fn for_level(&self, level: &str) -> Vec<&PeakModel> {
        self.rows.iter().filter(|row| row.level == level).collect()
    }

    /// Validates every row; the first violation rejects the whole table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.rows.iter().try_for_each(PeakModel::validate)
    }

    /// The id the next appended row receives: one past the largest numeric id.
    pub fn next_id(&self) -> String {
        let max_id = self
            .rows
            .iter()
            .filter_map(|row| row.id.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max_id + 1).to_string()
    }

    /// Appends a row with a fresh id and default error margins.
    pub fn add_row(
        &mut self,
        level: impl Into<String>,
        name: impl Into<String>,
        center: f64,
        fwhm: f64,
    ) -> &PeakModel {
        let id = self.next_id();
        self.rows.push(PeakModel::new(
            id,
            level,
            name,
            center,
            DEFAULT_CENTER_ERROR,
            fwhm,
            DEFAULT_FWHM_ERROR,
        ));
        &self.rows[self.rows.len() - 1]
    }

    pub fn remove(&mut self, id: &str) -> Option<PeakModel> {
        let index = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(index))
    }
}
