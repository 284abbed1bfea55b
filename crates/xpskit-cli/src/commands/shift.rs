use crate::cli::ShiftArgs;
use crate::config::{AnalyzeFlags, PartialRunConfig};
use crate::error::Result;
use crate::utils::output::write_to;
use xpskit::core::io::report::write_dataset;
use xpskit::workflows::session::AnalysisSession;

pub fn run(args: ShiftArgs) -> Result<()> {
    let session = AnalysisSession::from_environment()?;
    let config = PartialRunConfig::for_args(&args.run)?.merge_with_cli(
        &args.run,
        AnalyzeFlags {
            shift: Some(true),
            no_fit: false,
        },
        session.settings().load_shift_settings(),
    )?;

    let shifted = super::open_dataset(&session, &config, &args.run.input, true)?;

    write_to(args.output.as_deref(), |w| write_dataset(w, &shifted))?;
    if let Some(path) = &args.output {
        println!(
            "✓ {} shifted spectra written to: {}",
            shifted.len(),
            path.display()
        );
    }
    Ok(())
}
