use serde::{Deserialize, Serialize};

/// One reference sensitivity factor entry, keyed by spectral level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFactor {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub rsf: f64,
}

/// The reference-sensitivity-factor table used by quantification.
///
/// A level without an entry, or with a factor that is not a positive number, is
/// excluded from quantification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceFactorTable {
    rows: Vec<ReferenceFactor>,
}

impl ReferenceFactorTable {
    pub fn new(rows: Vec<ReferenceFactor>) -> Self {
        Self { rows }
    }

    /// Starter factors for the common copper/carbon/oxygen core lines.
    pub fn seed() -> Self {
        Self::new(vec![
            ReferenceFactor {
                level: "C1s".into(),
                rsf: 0.314,
            },
            ReferenceFactor {
                level: "O1s".into(),
                rsf: 0.733,
            },
            ReferenceFactor {
                level: "Cu2p3".into(),
                rsf: 2.626,
            },
        ])
    }

    pub fn rows(&self) -> &[ReferenceFactor] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The factor for a level, or `0.0` when the level is excluded.
    pub fn factor_for(&self, level: &str) -> f64 {
        self.rows
            .iter()
            .find(|row| row.level == level)
            .map(|row| row.rsf)
            .filter(|rsf| rsf.is_finite() && *rsf > 0.0)
            .unwrap_or(0.0)
    }

    /// Inserts or replaces the factor for a level, keeping the row's position.
    pub fn set(&mut self, level: impl Into<String>, rsf: f64) {
        let level = level.into();
        match self.rows.iter_mut().find(|row| row.level == level) {
            Some(row) => row.rsf = rsf,
            None => self.rows.push(ReferenceFactor { level, rsf }),
        }
    }

    pub fn remove(&mut self, level: &str) -> Option<ReferenceFactor> {
        let index = self.rows.iter().position(|row| row.level == level)?;
        Some(self.rows.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_nonpositive_factors_are_excluded() {
        let mut table = ReferenceFactorTable::seed();
        table.set("N1s", -1.0);
        assert_eq!(table.factor_for("O1s"), 0.733);
        assert_eq!(table.factor_for("N1s"), 0.0);
        assert_eq!(table.factor_for("Su1s"), 0.0);
    }

    #[test]
    fn set_updates_in_place_and_remove_deletes() {
        let mut table = ReferenceFactorTable::seed();
        table.set("C1s", 0.3);
        assert_eq!(table.rows()[0].rsf, 0.3);
        assert_eq!(table.rows().len(), 3);

        assert!(table.remove("O1s").is_some());
        assert!(table.remove("O1s").is_none());
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn reads_flat_level_rsf_records() {
        let table: ReferenceFactorTable =
            serde_json::from_str(r#"[{"level":"C1s","rsf":0.314},{"level":"O1s","rsf":0.733}]"#)
                .unwrap();
        assert_eq!(table.factor_for("C1s"), 0.314);
    }
}
