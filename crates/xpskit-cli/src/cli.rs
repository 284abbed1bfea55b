use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "XPSKit CLI - Load, charge-correct, quantify and peak-fit XPS spectra from the command line.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a raw instrument file, optionally shift-correct it, then quantify and fit every spectrum.
    Analyze(AnalyzeArgs),
    /// Load a raw instrument file, apply charge-shift correction and export the corrected spectra.
    Shift(ShiftArgs),
    /// Inspect or change the persisted per-user settings.
    Settings(SettingsArgs),
    /// Edit the saved peak-model table used for fitting.
    Peaks(PeaksArgs),
    /// Edit the saved relative-sensitivity-factor table used for quantification.
    Rsf(RsfArgs),
}

/// Options shared by every command that talks to the numerical subsystem.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to the raw instrument file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Optional run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Python interpreter hosting the analysis modules. Saved for later runs once it starts.
    #[arg(long, value_name = "PATH")]
    pub interpreter: Option<PathBuf>,

    /// Override the binding energy the reference peak is moved to.
    #[arg(long, value_name = "EV")]
    pub center: Option<f64>,

    /// Override the lower bound of the reference-peak search window.
    #[arg(long, value_name = "EV")]
    pub x_min: Option<f64>,

    /// Override the upper bound of the reference-peak search window.
    #[arg(long, value_name = "EV")]
    pub x_max: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S analysis.skip-fitting=true
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Write the result table as CSV instead of printing it.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write the analysed (possibly shifted) spectra as CSV.
    #[arg(long, value_name = "PATH")]
    pub dataset_out: Option<PathBuf>,

    /// Also write the per-spectrum atomic percentages as CSV.
    #[arg(long, value_name = "PATH")]
    pub atomic_out: Option<PathBuf>,

    /// Override `shift.enabled` from the config file.
    #[command(flatten)]
    pub shift: ShiftToggle,

    /// Quantify only; do not fit any spectrum.
    #[arg(long)]
    pub no_fit: bool,
}

/// A group to handle mutually exclusive boolean flags for shift correction.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct ShiftToggle {
    /// Apply charge-shift correction before analysing.
    #[arg(long)]
    pub shift: bool,
    /// Analyse the spectra as loaded.
    #[arg(long)]
    pub no_shift: bool,
}

impl ShiftToggle {
    pub fn requested(self) -> Option<bool> {
        if self.shift {
            Some(true)
        } else if self.no_shift {
            Some(false)
        } else {
            None
        }
    }
}

/// Arguments for the `shift` subcommand.
#[derive(Args, Debug)]
pub struct ShiftArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Write the corrected spectra as CSV instead of printing them.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `settings` subcommand.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show where each settings file is read from and written to.
    Path,
    /// Print the current shift settings, interpreter and table sizes.
    Show,
    /// Start the numerical subsystem with this interpreter and save it on success.
    SetInterpreter {
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Change and save the shift-correction parameters.
    SetShift {
        #[arg(long, value_name = "EV")]
        center: Option<f64>,
        #[arg(long, value_name = "EV")]
        x_min: Option<f64>,
        #[arg(long, value_name = "EV")]
        x_max: Option<f64>,
    },
}

/// Arguments for the `peaks` subcommand.
#[derive(Args, Debug)]
pub struct PeaksArgs {
    #[command(subcommand)]
    pub command: PeaksCommands,
}

#[derive(Subcommand, Debug)]
pub enum PeaksCommands {
    /// List the saved peak models (the seed set if none are saved).
    List,
    /// Append a peak model with a fresh id.
    Add {
        /// Core-level tag the model applies to (e.g. C1s).
        #[arg(required = true)]
        level: String,
        /// Component label (e.g. C-C).
        #[arg(required = true)]
        name: String,
        /// Initial peak position in eV.
        #[arg(long, required = true, value_name = "EV")]
        center: f64,
        /// Initial full width at half maximum in eV.
        #[arg(long, required = true, value_name = "EV")]
        fwhm: f64,
    },
    /// Remove the peak model with this id.
    Remove {
        #[arg(required = true)]
        id: String,
    },
    /// Save the built-in seed table.
    Init {
        /// Overwrite an existing table.
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the `rsf` subcommand.
#[derive(Args, Debug)]
pub struct RsfArgs {
    #[command(subcommand)]
    pub command: RsfCommands,
}

#[derive(Subcommand, Debug)]
pub enum RsfCommands {
    /// List the saved reference factors.
    List,
    /// Add or replace the factor for a core level.
    Set {
        #[arg(required = true)]
        level: String,
        #[arg(required = true)]
        rsf: f64,
    },
    /// Remove the factor for a core level.
    Remove {
        #[arg(required = true)]
        level: String,
    },
    /// Save the built-in seed factors.
    Init {
        /// Overwrite an existing table.
        #[arg(long)]
        force: bool,
    },
}
