use crate::cli::{RsfArgs, RsfCommands};
use crate::error::{CliError, Result};
use crate::utils::table;
use xpskit::core::models::rsf::ReferenceFactorTable;
use xpskit::core::settings::SettingsStore;

pub fn run(args: RsfArgs) -> Result<()> {
    let store = super::settings_store()?;
    match args.command {
        RsfCommands::List => handle_list(&store),
        RsfCommands::Set { level, rsf } => handle_set(&store, level, rsf),
        RsfCommands::Remove { level } => handle_remove(&store, &level),
        RsfCommands::Init { force } => handle_init(&store, force),
    }
}

fn handle_list(store: &SettingsStore) -> Result<()> {
    match store.load_reference_factors() {
        Some(factors) if !factors.is_empty() => {
            let rows: Vec<Vec<String>> = factors
                .rows()
                .iter()
                .map(|row| vec![row.level.clone(), format!("{:.3}", row.rsf)])
                .collect();
            print!("{}", table::render(&["Level", "RSF"], &rows));
        }
        _ => println!(
            "No reference factors saved; atomic percentages are reported as 0. \
             Run 'xpskit rsf init' to save the built-in set."
        ),
    }
    Ok(())
}

fn handle_set(store: &SettingsStore, level: String, rsf: f64) -> Result<()> {
    if level.trim().is_empty() {
        return Err(CliError::Argument("Level must not be empty.".to_string()));
    }
    if !rsf.is_finite() || rsf <= 0.0 {
        return Err(CliError::Argument(format!(
            "Sensitivity factor must be a positive number, got {}.",
            rsf
        )));
    }
    let mut factors = store.load_reference_factors().unwrap_or_default();
    factors.set(level.trim(), rsf);
    store.save_reference_factors(&factors)?;
    println!("✓ {} = {}", level.trim(), rsf);
    Ok(())
}

fn handle_remove(store: &SettingsStore, level: &str) -> Result<()> {
    let mut factors = store.load_reference_factors().unwrap_or_default();
    factors
        .remove(level)
        .ok_or_else(|| CliError::Argument(format!("No reference factor for '{}'.", level)))?;
    store.save_reference_factors(&factors)?;
    println!("✓ Removed {}", level);
    Ok(())
}

fn handle_init(store: &SettingsStore, force: bool) -> Result<()> {
    if store.load_reference_factors().is_some() && !force {
        return Err(CliError::Argument(
            "A reference-factor table already exists. Use --force to replace it.".to_string(),
        ));
    }
    let path = store.save_reference_factors(&ReferenceFactorTable::seed())?;
    println!("✓ Seed reference factors written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use xpskit::core::settings::SettingsResolver;

    fn store_in(dir: &std::path::Path) -> SettingsStore {
        SettingsStore::new(SettingsResolver::with_directories(
            dir.join("XPSUI_setting"),
            Vec::new(),
        ))
    }

    #[test]
    fn set_creates_then_replaces_a_level() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        handle_set(&store, "N1s".into(), 0.499).unwrap();
        handle_set(&store, " N1s ".into(), 0.477).unwrap();

        let saved = store.load_reference_factors().unwrap();
        assert_eq!(saved.rows().len(), 1);
        assert_eq!(saved.factor_for("N1s"), 0.477);
    }

    #[test]
    fn invalid_factors_are_rejected() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        for rsf in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                handle_set(&store, "C1s".into(), rsf),
                Err(CliError::Argument(_))
            ));
        }
        assert!(store.load_reference_factors().is_none());
    }

    #[test]
    fn remove_unknown_level_is_an_error() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        handle_init(&store, false).unwrap();

        handle_remove(&store, "O1s").unwrap();
        assert!(matches!(
            handle_remove(&store, "O1s"),
            Err(CliError::Argument(_))
        ));
        assert_eq!(store.load_reference_factors().unwrap().rows().len(), 2);
    }
}
