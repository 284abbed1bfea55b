use crate::cli::AnalyzeArgs;
use crate::config::{AnalyzeFlags, PartialRunConfig};
use crate::error::Result;
use crate::utils::output::write_to;
use crate::utils::progress::CliProgressHandler;
use crate::utils::table::render_result_rows;
use tracing::{info, warn};
use xpskit::core::io::report::{write_atomic_summary, write_dataset, write_report};
use xpskit::core::models::results::{FitOutcome, SkipReason};
use xpskit::engine::progress::ProgressReporter;
use xpskit::workflows::session::AnalysisSession;

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<()> {
    let session = AnalysisSession::from_environment()?;

    let partial_config = PartialRunConfig::for_args(&args.run)?;
    info!("Merging configuration from file and CLI arguments...");
    let flags = AnalyzeFlags {
        shift: args.shift.requested(),
        no_fit: args.no_fit,
    };
    let config =
        partial_config.merge_with_cli(&args.run, flags, session.settings().load_shift_settings())?;
    let session = session.with_config(config.analysis.clone());

    let dataset = super::open_dataset(&session, &config, &args.run.input, config.shift_enabled)?;

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let report = session.run_analysis(&reporter)?;

    for spectrum in &report.spectra {
        if let FitOutcome::Skipped(SkipReason::Failed(reason)) = &spectrum.fit {
            warn!(tag = %spectrum.tag, "Fit failed: {}", reason);
            if !quiet {
                eprintln!("Warning: {} was not fitted: {}", spectrum.tag, reason);
            }
        }
    }

    match &args.output {
        Some(path) => {
            write_to(Some(path.as_path()), |w| write_report(w, &report))?;
            println!("✓ Results written to: {}", path.display());
        }
        None => print!("{}", render_result_rows(&report.rows())),
    }

    if let Some(path) = &args.dataset_out {
        write_to(Some(path.as_path()), |w| write_dataset(w, &dataset))?;
        println!("✓ Spectra written to: {}", path.display());
    }
    if let Some(path) = &args.atomic_out {
        let atomic_percents = report.atomic_percents();
        write_to(Some(path.as_path()), |w| write_atomic_summary(w, &dataset, &atomic_percents))?;
        println!("✓ Atomic percentages written to: {}", path.display());
    }

    Ok(())
}
