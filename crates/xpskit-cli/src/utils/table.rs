use xpskit::core::models::results::AnalysisRow;

const COLUMN_GAP: &str = "  ";

/// Left-aligned plain-text table with a dashed rule under the header.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, headers.iter().copied(), &widths);
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join(COLUMN_GAP).trim_end());
    out.push('\n');
}

pub fn render_result_rows(rows: &[AnalysisRow]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.spectrum.clone(),
                row.component.clone(),
                row.position.clone(),
                row.fwhm.clone(),
                row.area.clone(),
                row.area_ratio.clone(),
                row.atomic_percent.clone(),
            ]
        })
        .collect();
    render(
        &[
            "Spectrum",
            "Component",
            "Position",
            "FWHM",
            "Area",
            "AreaRatio",
            "AtomicPercent",
        ],
        &body,
    )
}
