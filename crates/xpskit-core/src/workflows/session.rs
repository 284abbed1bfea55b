use crate::core::models::peaks::PeakModelTable;
use crate::core::models::results::AnalysisReport;
use crate::core::models::rsf::ReferenceFactorTable;
use crate::core::models::shift::ShiftSettings;
use crate::core::models::spectrum::Dataset;
use crate::core::settings::{SettingsError, SettingsResolver, SettingsStore};
use crate::engine::config::AnalysisConfig;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::gateway::{Gateway, InitMode};
use crate::engine::progress::ProgressReporter;
use crate::engine::store::DatasetStore;
use crate::engine::tasks;
use crate::workflows::analyze;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The operations a presentation layer drives, bound to one dataset, one gateway and
/// one settings folder.
///
/// Settings are read from disk at the moment each operation needs them, so edits
/// saved between operations take effect on the next call.
pub struct AnalysisSession {
    store: DatasetStore,
    gateway: Gateway,
    settings: SettingsStore,
    config: AnalysisConfig,
}

impl AnalysisSession {
    pub fn new(gateway: Gateway, settings: SettingsStore) -> Self {
        Self {
            store: DatasetStore::new(),
            gateway,
            settings,
            config: AnalysisConfig::default(),
        }
    }

    /// A session backed by the Python bridge and the current user's settings folder.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Settings`] if no settings directory can be determined.
    pub fn from_environment() -> Result<Self, EngineError> {
        let resolver = SettingsResolver::from_environment()?;
        Ok(Self::new(Gateway::python(), SettingsStore::new(resolver)))
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// The current dataset snapshot.
    pub fn dataset(&self) -> Arc<Dataset> {
        self.store.snapshot()
    }

    /// Starts the numerical subsystem if it is not running yet.
    ///
    /// An explicit `library` takes precedence over the persisted one and is persisted
    /// once start-up with it has succeeded. A persisted path that no longer exists is
    /// ignored in favour of the system default.
    ///
    /// # Errors
    ///
    /// In [`InitMode::Interactive`], returns [`EngineError::SubsystemInit`] on failure,
    /// or [`EngineError::Settings`] if the successful path cannot be persisted.
    #[instrument(skip_all, name = "initialize_subsystem")]
    pub fn initialize_subsystem(
        &self,
        library: Option<&Path>,
        mode: InitMode,
    ) -> Result<bool, EngineError> {
        if self.gateway.is_initialized() {
            return Ok(true);
        }

        let persisted = match library {
            Some(_) => None,
            None => self.persisted_library(),
        };
        let effective = library.or(persisted.as_deref());

        let started = self.gateway.initialize(effective, mode)?;
        if started {
            if let Some(path) = library {
                self.settings.save_library_path(path)?;
                info!("Saved numerical-subsystem path {:?}", path);
            }
        }
        Ok(started)
    }

    fn persisted_library(&self) -> Option<PathBuf> {
        let path = self.settings.load_library_path()?;
        if path.is_file() {
            Some(path)
        } else {
            warn!(
                "Saved numerical-subsystem path {:?} does not exist; using the system default.",
                path
            );
            None
        }
    }

    /// Replaces the dataset with the contents of a raw instrument file.
    ///
    /// # Errors
    ///
    /// See [`tasks::load::run`].
    pub fn load(&self, path: &Path) -> Result<Arc<Dataset>, EngineError> {
        tasks::load::run(&self.gateway, &self.store, path)
    }

    /// Applies shift correction with explicit parameters.
    ///
    /// # Errors
    ///
    /// See [`tasks::shift::run`].
    pub fn apply_shift(&self, settings: &ShiftSettings) -> Result<Arc<Dataset>, EngineError> {
        tasks::shift::run(&self.gateway, &self.store, settings)
    }

    /// Applies shift correction with the persisted parameters (or their defaults).
    pub fn apply_saved_shift(&self) -> Result<Arc<Dataset>, EngineError> {
        let settings = self.settings.load_shift_settings();
        self.apply_shift(&settings)
    }

    /// Atomic percentages of the current dataset using the persisted
    /// reference-factor table.
    ///
    /// # Errors
    ///
    /// See [`tasks::quantify::run`].
    pub fn compute_atomic_percents(&self) -> Result<Vec<f64>, EngineError> {
        let dataset = self.store.snapshot();
        let factors = self.settings.load_reference_factors();
        tasks::quantify::run(&self.gateway, &dataset, factors.as_ref())
    }

    /// Quantifies and fits the current dataset using the persisted tables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyDataset`] when nothing is loaded, or whatever
    /// [`analyze::run`] reports.
    pub fn run_analysis(&self, reporter: &ProgressReporter) -> Result<AnalysisReport, EngineError> {
        let dataset = self.store.snapshot();
        if dataset.is_empty() {
            return Err(EngineError::EmptyDataset);
        }
        let peak_models = self.settings.load_peak_models();
        let factors = self.settings.load_reference_factors();
        let context = AnalysisContext::new(&self.gateway, reporter, &self.config);
        analyze::run(&context, &dataset, peak_models.as_ref(), factors.as_ref())
    }

    /// Validates and persists a peak-model table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] if any row is non-physical; nothing is
    /// written in that case.
    pub fn save_peak_models(&self, table: &PeakModelTable) -> Result<PathBuf, EngineError> {
        self.settings.save_peak_models(table).map_err(|e| match e {
            SettingsError::Validation(v) => EngineError::Validation(v),
            other => EngineError::Settings(other),
        })
    }

    pub fn save_reference_factors(
        &self,
        table: &ReferenceFactorTable,
    ) -> Result<PathBuf, EngineError> {
        Ok(self.settings.save_reference_factors(table)?)
    }

    pub fn save_shift_settings(&self, settings: &ShiftSettings) -> Result<PathBuf, EngineError> {
        Ok(self.settings.save_shift_settings(settings)?)
    }
}
