use serde::Serialize;

pub const TOTAL_COMPONENT_LABEL: &str = "(Total)";
pub const PLACEHOLDER: &str = "-";

/// One fitted component as returned by the fitting routine, already validated finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedComponent {
    pub name: String,
    pub center: f64,
    pub fwhm: f64,
    pub area: f64,
    pub ratio: f64,
}

/// Why a spectrum produced no component rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fitting was turned off for this run.
    Disabled,
    /// Index 0 is the wide survey scan.
    Survey,
    /// The tag is on the exclusion list (Auger lines).
    ExcludedTag,
    /// No peak-model table exists, so fitting was not attempted at all.
    NoPeakModelTable,
    /// The table exists but has no rows for this tag.
    NoMatchingModels,
    /// Background removal or fitting failed; the message is kept for reporting.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Fitted(Vec<FittedComponent>),
    Skipped(SkipReason),
}

/// Analysis result for a single spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumAnalysis {
    pub tag: String,
    pub atomic_percent: f64,
    pub fit: FitOutcome,
}

impl SpectrumAnalysis {
    pub fn components(&self) -> &[FittedComponent] {
        match &self.fit {
            FitOutcome::Fitted(components) => components,
            FitOutcome::Skipped(_) => &[],
        }
    }
}

/// Structured output of an analysis run, one entry per spectrum in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub spectra: Vec<SpectrumAnalysis>,
}

impl AnalysisReport {
    /// Flattens the report into display rows.
    ///
    /// Every spectrum contributes its `(Total)` row first, followed by its fitted
    /// components in the order the fitting routine returned them.
    pub fn rows(&self) -> Vec<AnalysisRow> {
        let mut rows = Vec::with_capacity(self.spectra.len());
        for spectrum in &self.spectra {
            rows.push(AnalysisRow::total(&spectrum.tag, spectrum.atomic_percent));
            rows.extend(spectrum.components().iter().map(AnalysisRow::component));
        }
        rows
    }

    pub fn atomic_percents(&self) -> Vec<f64> {
        self.spectra.iter().map(|s| s.atomic_percent).collect()
    }
}

/// A pre-formatted result table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisRow {
    pub spectrum: String,
    pub component: String,
    pub position: String,
    #[serde(rename = "FWHM")]
    pub fwhm: String,
    pub area: String,
    pub area_ratio: String,
    pub atomic_percent: String,
}

impl AnalysisRow {
    pub fn total(tag: &str, atomic_percent: f64) -> Self {
        let atomic_percent = if atomic_percent > 0.0 {
            format!("{atomic_percent:.2}")
        } else {
            PLACEHOLDER.to_string()
        };
        Self {
            spectrum: tag.to_string(),
            component: TOTAL_COMPONENT_LABEL.to_string(),
            position: PLACEHOLDER.to_string(),
            fwhm: PLACEHOLDER.to_string(),
            area: PLACEHOLDER.to_string(),
            area_ratio: PLACEHOLDER.to_string(),
            atomic_percent,
        }
    }

    pub fn component(component: &FittedComponent) -> Self {
        Self {
            spectrum: String::new(),
            component: component.name.clone(),
            position: format!("{:.2}", component.center),
            fwhm: format!("{:.2}", component.fwhm),
            area: format!("{:.0}", component.area),
            area_ratio: format!("{:.1}", component.ratio),
            atomic_percent: String::new(),
        }
    }

    pub fn is_total(&self) -> bool {
        self.component == TOTAL_COMPONENT_LABEL && !self.spectrum.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str) -> FittedComponent {
        FittedComponent {
            name: name.into(),
            center: 284.8049,
            fwhm: 1.104,
            area: 15234.56,
            ratio: 61.249,
        }
    }

    #[test]
    fn total_row_uses_placeholder_for_zero_atomic_percent() {
        let row = AnalysisRow::total("Su1s", 0.0);
        assert_eq!(row.atomic_percent, PLACEHOLDER);
        assert_eq!(row.position, PLACEHOLDER);
        assert!(row.is_total());

        let row = AnalysisRow::total("C1s", 42.4567);
        assert_eq!(row.atomic_percent, "42.46");
    }

    #[test]
    fn component_row_formats_numbers_and_leaves_spectrum_blank() {
        let row = AnalysisRow::component(&component("C-C"));
        assert_eq!(row.spectrum, "");
        assert_eq!(row.position, "284.80");
        assert_eq!(row.fwhm, "1.10");
        assert_eq!(row.area, "15235");
        assert_eq!(row.area_ratio, "61.2");
        assert_eq!(row.atomic_percent, "");
        assert!(!row.is_total());
    }

    #[test]
    fn rows_put_each_total_before_its_components() {
        let report = AnalysisReport {
            spectra: vec![
                SpectrumAnalysis {
                    tag: "Su1s".into(),
                    atomic_percent: 0.0,
                    fit: FitOutcome::Skipped(SkipReason::Survey),
                },
                SpectrumAnalysis {
                    tag: "C1s".into(),
                    atomic_percent: 60.0,
                    fit: FitOutcome::Fitted(vec![component("C-C"), component("C-O")]),
                },
                SpectrumAnalysis {
                    tag: "O1s".into(),
                    atomic_percent: 40.0,
                    fit: FitOutcome::Skipped(SkipReason::NoMatchingModels),
                },
            ],
        };

        let labels: Vec<_> = report
            .rows()
            .into_iter()
            .map(|r| format!("{}|{}", r.spectrum, r.component))
            .collect();
        assert_eq!(
            labels,
            vec!["Su1s|(Total)", "C1s|(Total)", "|C-C", "|C-O", "O1s|(Total)"]
        );
        assert_eq!(report.atomic_percents(), vec![0.0, 60.0, 40.0]);
    }
}
