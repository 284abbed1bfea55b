use super::error::SettingsError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user folder holding every settings document.
pub const SETTINGS_DIR_NAME: &str = "XPSUI_setting";

/// Outcome of looking a settings file up across the candidate directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The file exists at this path.
    Found(PathBuf),
    /// No candidate holds the file; this is where it would be written.
    Missing(PathBuf),
}

impl Resolved {
    pub fn path(&self) -> &Path {
        match self {
            Resolved::Found(path) | Resolved::Missing(path) => path,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Resolved::Found(_))
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Resolved::Found(path) | Resolved::Missing(path) => path,
        }
    }
}

/// Locates settings files across an ordered list of directories.
///
/// Reads try, in order: the canonical documents-folder location, the same folder under
/// the user profile's `Documents` path, and the directory of the running program.
/// Writes always go to the canonical location. The profile fallback keeps files
/// discoverable when the documents folder has been redirected (e.g. by a cloud-sync
/// client) away from where an earlier version dropped them.
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    canonical: PathBuf,
    fallbacks: Vec<PathBuf>,
}

impl SettingsResolver {
    /// Builds the resolver from the current user's environment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoSettingsDirectory`] if neither a home directory nor the
    /// program directory can be determined.
    pub fn from_environment() -> Result<Self, SettingsError> {
        let user_dirs = UserDirs::new();
        let profile_documents = user_dirs
            .as_ref()
            .map(|dirs| dirs.home_dir().join("Documents").join(SETTINGS_DIR_NAME));
        let documents = user_dirs
            .as_ref()
            .and_then(|dirs| dirs.document_dir())
            .map(|dir| dir.join(SETTINGS_DIR_NAME));
        let program_dir = program_directory();

        let canonical = documents
            .or_else(|| profile_documents.clone())
            .or_else(|| program_dir.clone())
            .ok_or(SettingsError::NoSettingsDirectory)?;

        let fallbacks = profile_documents.into_iter().chain(program_dir).collect();
        let resolver = Self::with_directories(canonical, fallbacks);
        debug!(
            "Settings resolver candidates: {:?}",
            resolver.candidate_dirs().collect::<Vec<_>>()
        );
        Ok(resolver)
    }

    /// Builds a resolver from explicit directories. Duplicates of earlier candidates
    /// are dropped so each directory is probed once.
    pub fn with_directories(canonical: PathBuf, fallbacks: Vec<PathBuf>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(fallbacks.len());
        for dir in fallbacks {
            if dir != canonical && !unique.contains(&dir) {
                unique.push(dir);
            }
        }
        Self {
            canonical,
            fallbacks: unique,
        }
    }

    pub fn canonical_dir(&self) -> &Path {
        &self.canonical
    }

    /// Candidate directories in read-resolution order.
    pub fn candidate_dirs(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.canonical.as_path()).chain(self.fallbacks.iter().map(PathBuf::as_path))
    }

    /// Finds the first candidate directory containing `file_name`.
    ///
    /// When no candidate has it, the canonical path is returned as
    /// [`Resolved::Missing`] so the caller can apply defaults.
    pub fn resolve(&self, file_name: &str) -> Resolved {
        self.candidate_dirs()
            .map(|dir| dir.join(file_name))
            .find(|path| path.is_file())
            .map(Resolved::Found)
            .unwrap_or_else(|| Resolved::Missing(self.canonical.join(file_name)))
    }

    /// The canonical path for `file_name`, creating the settings folder if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the folder cannot be created.
    pub fn writable_path(&self, file_name: &str) -> Result<PathBuf, SettingsError> {
        fs::create_dir_all(&self.canonical).map_err(|e| SettingsError::Io {
            path: self.canonical.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(self.canonical.join(file_name))
    }
}

/// Directory containing the running executable, if it can be determined.
pub fn program_directory() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn three_roots(base: &Path) -> SettingsResolver {
        SettingsResolver::with_directories(
            base.join("documents").join(SETTINGS_DIR_NAME),
            vec![
                base.join("profile").join(SETTINGS_DIR_NAME),
                base.join("program"),
            ],
        )
    }

    #[test]
    fn canonical_location_wins_when_present_everywhere() {
        let temp = tempdir().unwrap();
        let resolver = three_roots(temp.path());
        for dir in resolver.candidate_dirs() {
            fs::create_dir_all(dir).unwrap();
            fs::write(dir.join("RSF.json"), "[]").unwrap();
        }

        let resolved = resolver.resolve("RSF.json");
        assert_eq!(
            resolved,
            Resolved::Found(temp.path().join("documents").join(SETTINGS_DIR_NAME).join("RSF.json"))
        );
    }

    #[test]
    fn falls_back_to_profile_then_program_directory() {
        let temp = tempdir().unwrap();
        let resolver = three_roots(temp.path());

        let program = temp.path().join("program");
        fs::create_dir_all(&program).unwrap();
        fs::write(program.join("peakfit.json"), "[]").unwrap();
        assert_eq!(
            resolver.resolve("peakfit.json"),
            Resolved::Found(program.join("peakfit.json"))
        );

        let profile = temp.path().join("profile").join(SETTINGS_DIR_NAME);
        fs::create_dir_all(&profile).unwrap();
        fs::write(profile.join("peakfit.json"), "[]").unwrap();
        assert_eq!(
            resolver.resolve("peakfit.json"),
            Resolved::Found(profile.join("peakfit.json"))
        );
    }

    #[test]
    fn missing_file_resolves_to_canonical_path_without_creating_it() {
        let temp = tempdir().unwrap();
        let resolver = three_roots(temp.path());

        let resolved = resolver.resolve("shift_setting.json");
        assert!(!resolved.exists());
        assert_eq!(resolved.path(), resolver.canonical_dir().join("shift_setting.json"));
        assert!(!resolver.canonical_dir().exists());
    }

    #[test]
    fn writable_path_creates_the_canonical_folder() {
        let temp = tempdir().unwrap();
        let resolver = three_roots(temp.path());

        let path = resolver.writable_path("path.json").unwrap();
        assert!(resolver.canonical_dir().is_dir());
        assert_eq!(path, resolver.canonical_dir().join("path.json"));
    }

    #[test]
    fn duplicate_candidates_are_probed_once() {
        let temp = tempdir().unwrap();
        let canonical = temp.path().join("docs");
        let resolver = SettingsResolver::with_directories(
            canonical.clone(),
            vec![canonical.clone(), temp.path().join("exe"), temp.path().join("exe")],
        );
        assert_eq!(resolver.candidate_dirs().count(), 2);
    }
}
