use crate::core::models::results::{AnalysisReport, AnalysisRow};
use crate::core::models::spectrum::Dataset;
use serde::Serialize;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Atomic-percent count ({values}) does not match the number of spectra ({spectra})"
    )]
    CountMismatch { spectra: usize, values: usize },
}

#[derive(Serialize)]
struct SamplePoint<'a> {
    tag: &'a str,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct AtomicSummaryRow<'a> {
    tag: &'a str,
    atomic_percent: f64,
}

/// Writes the flattened result table with a header row.
pub fn write_result_rows<W: Write>(writer: W, rows: &[AnalysisRow]) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the report's rows; convenience over [`write_result_rows`].
pub fn write_report<W: Write>(writer: W, report: &AnalysisReport) -> Result<(), ReportError> {
    write_result_rows(writer, &report.rows())
}

/// Writes every sample of every spectrum in long form: one `tag,x,y` line per point,
/// spectra in dataset order.
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for spectrum in dataset.iter() {
        for (&x, &y) in spectrum.x().iter().zip(spectrum.y()) {
            csv.serialize(SamplePoint {
                tag: spectrum.tag(),
                x,
                y,
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Writes a `tag,atomic_percent` summary.
///
/// # Errors
///
/// Returns [`ReportError::CountMismatch`] when `atomic_percents` is not index-aligned
/// with the dataset; nothing is written in that case.
pub fn write_atomic_summary<W: Write>(
    writer: W,
    dataset: &Dataset,
    atomic_percents: &[f64],
) -> Result<(), ReportError> {
    if dataset.len() != atomic_percents.len() {
        return Err(ReportError::CountMismatch {
            spectra: dataset.len(),
            values: atomic_percents.len(),
        });
    }

    let mut csv = csv::Writer::from_writer(writer);
    for (spectrum, &atomic_percent) in dataset.iter().zip(atomic_percents) {
        csv.serialize(AtomicSummaryRow {
            tag: spectrum.tag(),
            atomic_percent,
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::results::{FitOutcome, FittedComponent, SkipReason, SpectrumAnalysis};
    use crate::core::models::spectrum::Spectrum;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Spectrum::new("Su1s", vec![0.0, 1.0], vec![10.0, 11.0]).unwrap(),
            Spectrum::new("C1s", vec![284.0], vec![5.5]).unwrap(),
        ])
    }

    #[test]
    fn result_rows_have_header_and_placeholders() {
        let report = AnalysisReport {
            spectra: vec![
                SpectrumAnalysis {
                    tag: "Su1s".into(),
                    atomic_percent: 0.0,
                    fit: FitOutcome::Skipped(SkipReason::Survey),
                },
                SpectrumAnalysis {
                    tag: "C1s".into(),
                    atomic_percent: 42.123,
                    fit: FitOutcome::Fitted(vec![FittedComponent {
                        name: "C-C".into(),
                        center: 284.8,
                        fwhm: 1.234,
                        area: 1520.6,
                        ratio: 100.0,
                    }]),
                },
            ],
        };

        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Spectrum,Component,Position,FWHM,Area,AreaRatio,AtomicPercent",
                "Su1s,(Total),-,-,-,-,-",
                "C1s,(Total),-,-,-,-,42.12",
                ",C-C,284.80,1.23,1521,100.0,",
            ]
        );
    }

    #[test]
    fn dataset_is_written_in_long_form() {
        let mut out = Vec::new();
        write_dataset(&mut out, &dataset()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "tag,x,y");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "C1s,284.0,5.5");
    }

    #[test]
    fn atomic_summary_rejects_misaligned_values() {
        let mut out = Vec::new();
        let err = write_atomic_summary(&mut out, &dataset(), &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ReportError::CountMismatch {
                spectra: 2,
                values: 1
            }
        ));
        assert!(out.is_empty());

        write_atomic_summary(&mut out, &dataset(), &[0.0, 100.0]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("tag,atomic_percent\n"));
        assert!(text.contains("C1s,100.0"));
    }
}
