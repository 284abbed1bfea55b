use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use xpskit::core::models::shift::ShiftSettings;
use xpskit::engine::config::{AnalysisConfig, AnalysisConfigBuilder, DEFAULT_EXCLUDED_TAGS};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialShiftConfig {
    center: Option<f64>,
    #[serde(rename = "x-min")]
    x_min: Option<f64>,
    #[serde(rename = "x-max")]
    x_max: Option<f64>,
    enabled: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialAnalysisConfig {
    #[serde(rename = "excluded-tags")]
    excluded_tags: Option<Vec<String>>,
    #[serde(rename = "skip-fitting")]
    skip_fitting: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSubsystemConfig {
    interpreter: Option<PathBuf>,
}

/// Run options as read from a TOML file, before `--set` values and flags are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    shift: Option<PartialShiftConfig>,
    analysis: Option<PartialAnalysisConfig>,
    subsystem: Option<PartialSubsystemConfig>,
}

/// Flags only the `analyze` command has.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeFlags {
    pub shift: Option<bool>,
    pub no_fit: bool,
}

/// Fully merged options for one command run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub shift_enabled: bool,
    pub shift: ShiftSettings,
    pub analysis: AnalysisConfig,
    pub interpreter: Option<PathBuf>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reads `args.config` when given, otherwise starts from an empty configuration.
    pub fn for_args(args: &RunArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves every option. Precedence, highest first: dedicated flags, `--set`
    /// values, the TOML file, the persisted shift settings, built-in defaults.
    /// The shift window is only checked when shifting is enabled.
    pub fn merge_with_cli(
        mut self,
        args: &RunArgs,
        flags: AnalyzeFlags,
        persisted_shift: ShiftSettings,
    ) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let shift_config = self.shift.take().unwrap_or_default();
        let analysis_config = self.analysis.take().unwrap_or_default();
        let subsystem_config = self.subsystem.take().unwrap_or_default();

        let shift = ShiftSettings {
            shift_peak_center: args
                .center
                .or(shift_config.center)
                .unwrap_or(persisted_shift.shift_peak_center),
            x_min: args
                .x_min
                .or(shift_config.x_min)
                .unwrap_or(persisted_shift.x_min),
            x_max: args
                .x_max
                .or(shift_config.x_max)
                .unwrap_or(persisted_shift.x_max),
        };
        let shift_enabled = flags.shift.or(shift_config.enabled).unwrap_or(false);
        if shift_enabled {
            validate_window(&shift)?;
        }

        let excluded_tags = analysis_config.excluded_tags.unwrap_or_else(|| {
            DEFAULT_EXCLUDED_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect()
        });
        let skip_fitting = flags.no_fit || analysis_config.skip_fitting.unwrap_or(false);

        Ok(RunConfig {
            shift_enabled,
            shift,
            analysis: AnalysisConfigBuilder::new()
                .excluded_tags(excluded_tags)
                .skip_fitting(skip_fitting)
                .build(),
            interpreter: args.interpreter.clone().or(subsystem_config.interpreter),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "shift.center" => {
                    self.shift.get_or_insert_with(Default::default).center =
                        Some(parse_float(key, value_str)?);
                }
                "shift.x-min" => {
                    self.shift.get_or_insert_with(Default::default).x_min =
                        Some(parse_float(key, value_str)?);
                }
                "shift.x-max" => {
                    self.shift.get_or_insert_with(Default::default).x_max =
                        Some(parse_float(key, value_str)?);
                }
                "shift.enabled" => {
                    self.shift.get_or_insert_with(Default::default).enabled =
                        Some(parse_bool(key, value_str)?);
                }
                "analysis.skip-fitting" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .skip_fitting = Some(parse_bool(key, value_str)?);
                }
                "analysis.excluded-tags" => {
                    self.analysis
                        .get_or_insert_with(Default::default)
                        .excluded_tags = Some(
                        value_str
                            .split(',')
                            .map(str::trim)
                            .filter(|tag| !tag.is_empty())
                            .map(str::to_string)
                            .collect(),
                    );
                }
                "subsystem.interpreter" => {
                    self.subsystem
                        .get_or_insert_with(Default::default)
                        .interpreter = Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CliError::Config(format!("Invalid float value for {}: {}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid boolean value for {}: {}", key, value)))
}

/// Rejects a search window that cannot contain a peak.
pub fn validate_window(shift: &ShiftSettings) -> Result<()> {
    if shift.x_min.is_nan() || shift.x_max.is_nan() || shift.x_min >= shift.x_max {
        return Err(CliError::Config(format!(
            "Shift search window is empty: x-min {} must be below x-max {}.",
            shift.x_min, shift.x_max
        )));
    }
    Ok(())
}
