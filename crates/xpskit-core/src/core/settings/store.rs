use super::error::SettingsError;
use super::resolver::{Resolved, SettingsResolver};
use crate::core::models::peaks::PeakModelTable;
use crate::core::models::rsf::ReferenceFactorTable;
use crate::core::models::shift::ShiftSettings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SHIFT_SETTINGS_FILE: &str = "shift_setting.json";
pub const REFERENCE_FACTORS_FILE: &str = "RSF.json";
pub const PEAK_MODELS_FILE: &str = "peakfit.json";
pub const LIBRARY_PATH_FILE: &str = "path.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryPathDocument {
    #[serde(rename = "libraryPath", alias = "PythonDllPath", default)]
    library_path: String,
}

/// Typed access to the per-user settings documents.
///
/// Reads are optimistic and never fail: a missing file yields the documented
/// default, and a corrupt one is logged and treated as missing. Writes always target
/// the canonical settings folder.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    resolver: SettingsResolver,
}

impl SettingsStore {
    pub fn new(resolver: SettingsResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    pub fn load_shift_settings(&self) -> ShiftSettings {
        self.read_or_recover(SHIFT_SETTINGS_FILE).unwrap_or_default()
    }

    pub fn save_shift_settings(&self, settings: &ShiftSettings) -> Result<PathBuf, SettingsError> {
        self.write(SHIFT_SETTINGS_FILE, settings)
    }

    /// The reference-factor table, or `None` when no table has been saved yet.
    pub fn load_reference_factors(&self) -> Option<ReferenceFactorTable> {
        self.read_or_recover(REFERENCE_FACTORS_FILE)
    }

    pub fn save_reference_factors(
        &self,
        table: &ReferenceFactorTable,
    ) -> Result<PathBuf, SettingsError> {
        self.write(REFERENCE_FACTORS_FILE, table)
    }

    /// The peak-model table, or `None` when no table has been saved yet.
    pub fn load_peak_models(&self) -> Option<PeakModelTable> {
        self.read_or_recover(PEAK_MODELS_FILE)
    }

    /// The saved peak-model table, or the built-in seed rows for a first edit.
    pub fn peak_models_or_seed(&self) -> PeakModelTable {
        self.load_peak_models().unwrap_or_else(PeakModelTable::seed)
    }

    /// Persists the peak-model table after validating every row.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Validation`] without touching the file if any row is
    /// non-physical, or an I/O / JSON error if writing fails.
    pub fn save_peak_models(&self, table: &PeakModelTable) -> Result<PathBuf, SettingsError> {
        table.validate()?;
        self.write(PEAK_MODELS_FILE, table)
    }

    pub fn load_library_path(&self) -> Option<PathBuf> {
        self.read_or_recover::<LibraryPathDocument>(LIBRARY_PATH_FILE)
            .map(|doc| doc.library_path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    pub fn save_library_path(&self, path: &Path) -> Result<PathBuf, SettingsError> {
        let doc = LibraryPathDocument {
            library_path: path.to_string_lossy().to_string(),
        };
        self.write(LIBRARY_PATH_FILE, &doc)
    }

    fn read<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>, SettingsError> {
        let path = match self.resolver.resolve(file_name) {
            Resolved::Found(path) => path,
            Resolved::Missing(path) => {
                debug!("Settings file {:?} not found; using defaults.", path);
                return Ok(None);
            }
        };

        let content = fs::read_to_string(&path).map_err(|e| SettingsError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let value = serde_json::from_str(&content).map_err(|e| SettingsError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        debug!("Loaded settings from {:?}", path);
        Ok(Some(value))
    }

    fn read_or_recover<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        match self.read(file_name) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable settings file ({}); using defaults.", e);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, SettingsError> {
        let path = self.resolver.writable_path(file_name)?;
        let json = serde_json::to_string_pretty(value).map_err(|e| SettingsError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|e| SettingsError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::peaks::PeakModel;
    use tempfile::{TempDir, tempdir};

    fn store_in(temp: &TempDir) -> SettingsStore {
        SettingsStore::new(SettingsResolver::with_directories(
            temp.path().join("canonical"),
            vec![temp.path().join("program")],
        ))
    }

    #[test]
    fn absent_files_yield_documented_defaults() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        assert_eq!(store.load_shift_settings(), ShiftSettings::default());
        assert!(store.load_reference_factors().is_none());
        assert!(store.load_peak_models().is_none());
        assert_eq!(store.peak_models_or_seed(), PeakModelTable::seed());
        assert!(store.load_library_path().is_none());
    }

    #[test]
    fn corrupt_shift_file_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let path = store.resolver().writable_path(SHIFT_SETTINGS_FILE).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(store.load_shift_settings(), ShiftSettings::default());
    }

    #[test]
    fn shift_settings_round_trip_through_canonical_folder() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let settings = ShiftSettings {
            shift_peak_center: 284.8,
            x_max: 292.0,
            x_min: 279.0,
        };

        let path = store.save_shift_settings(&settings).unwrap();
        assert!(path.starts_with(temp.path().join("canonical")));
        assert!(fs::read_to_string(&path).unwrap().contains("\"ShiftPeakCenter\""));
        assert_eq!(store.load_shift_settings(), settings);
    }

    #[test]
    fn rejected_peak_table_leaves_file_untouched() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let path = store.save_peak_models(&PeakModelTable::seed()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut invalid = PeakModelTable::seed();
        invalid.add_row("N1s", "C-N", 0.0, 1.0);
        let err = store.save_peak_models(&invalid).unwrap_err();

        assert!(matches!(err, SettingsError::Validation(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn peak_table_saved_then_loaded_matches() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let table = PeakModelTable::new(vec![PeakModel::new(
            "1", "C1s", "C-C", 284.8, 0.5, 1.0, 0.3,
        )]);
        store.save_peak_models(&table).unwrap();
        assert_eq!(store.load_peak_models(), Some(table));
    }

    #[test]
    fn reads_fall_back_to_program_directory() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let program = temp.path().join("program");
        fs::create_dir_all(&program).unwrap();
        fs::write(
            program.join(REFERENCE_FACTORS_FILE),
            r#"[{"level":"C1s","rsf":0.314}]"#,
        )
        .unwrap();

        let table = store.load_reference_factors().unwrap();
        assert_eq!(table.factor_for("C1s"), 0.314);
    }

    #[test]
    fn library_path_accepts_legacy_key_and_ignores_blank() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let path = store.resolver().writable_path(LIBRARY_PATH_FILE).unwrap();

        fs::write(&path, r#"{"PythonDllPath": "/opt/python/bin/python3"}"#).unwrap();
        assert_eq!(
            store.load_library_path(),
            Some(PathBuf::from("/opt/python/bin/python3"))
        );

        fs::write(&path, r#"{"libraryPath": "   "}"#).unwrap();
        assert!(store.load_library_path().is_none());

        store.save_library_path(Path::new("/usr/bin/python3")).unwrap();
        assert_eq!(store.load_library_path(), Some(PathBuf::from("/usr/bin/python3")));
    }
}
