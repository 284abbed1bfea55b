use crate::error::{CliError, Result};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use xpskit::core::io::ReportError;

/// Runs a CSV writer against `path`, or against stdout when no path is given.
pub fn write_to<F>(path: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::result::Result<(), ReportError>,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(&mut writer).map_err(|source| CliError::Report {
                path: path.to_path_buf(),
                source,
            })?;
            writer.flush()?;
            info!("Wrote {:?}", path);
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock).map_err(|source| CliError::Report {
                path: PathBuf::from("<stdout>"),
                source,
            })
        }
    }
}
