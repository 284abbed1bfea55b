use crate::cli::{SettingsArgs, SettingsCommands};
use crate::config::validate_window;
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;
use xpskit::core::settings::store::{
    LIBRARY_PATH_FILE, PEAK_MODELS_FILE, REFERENCE_FACTORS_FILE, SHIFT_SETTINGS_FILE,
};
use xpskit::core::settings::{Resolved, SettingsStore};
use xpskit::engine::gateway::InitMode;
use xpskit::workflows::session::AnalysisSession;

pub fn run(args: SettingsArgs) -> Result<()> {
    match args.command {
        SettingsCommands::Path => handle_path(&super::settings_store()?),
        SettingsCommands::Show => handle_show(&super::settings_store()?),
        SettingsCommands::SetInterpreter { path } => handle_set_interpreter(path),
        SettingsCommands::SetShift {
            center,
            x_min,
            x_max,
        } => handle_set_shift(&super::settings_store()?, center, x_min, x_max),
    }
}

fn handle_path(store: &SettingsStore) -> Result<()> {
    println!(
        "Settings directory: {}",
        store.resolver().canonical_dir().display()
    );
    for file_name in [
        SHIFT_SETTINGS_FILE,
        REFERENCE_FACTORS_FILE,
        PEAK_MODELS_FILE,
        LIBRARY_PATH_FILE,
    ] {
        match store.resolver().resolve(file_name) {
            Resolved::Found(path) => println!("  {:<20} {}", file_name, path.display()),
            Resolved::Missing(path) => {
                println!("  {:<20} {} (not created yet)", file_name, path.display())
            }
        }
    }
    Ok(())
}

fn handle_show(store: &SettingsStore) -> Result<()> {
    let shift = store.load_shift_settings();
    println!("Shift correction:");
    println!("  reference center  {:.2} eV", shift.shift_peak_center);
    println!(
        "  search window     {:.2} - {:.2} eV",
        shift.x_min, shift.x_max
    );

    match store.load_library_path() {
        Some(path) => println!("Interpreter:        {}", path.display()),
        None => println!("Interpreter:        system default"),
    }
    match store.load_peak_models() {
        Some(table) => println!("Peak models:        {} saved", table.len()),
        None => println!("Peak models:        none saved (fitting is skipped)"),
    }
    match store.load_reference_factors() {
        Some(table) if !table.is_empty() => {
            println!("Reference factors:  {} saved", table.rows().len())
        }
        _ => println!("Reference factors:  none saved (atomic percentages are 0)"),
    }
    Ok(())
}

fn handle_set_interpreter(path: PathBuf) -> Result<()> {
    let session = AnalysisSession::from_environment()?;
    session.initialize_subsystem(Some(path.as_path()), InitMode::Interactive)?;
    println!("✓ Numerical subsystem started; interpreter saved: {}", path.display());
    Ok(())
}

fn handle_set_shift(
    store: &SettingsStore,
    center: Option<f64>,
    x_min: Option<f64>,
    x_max: Option<f64>,
) -> Result<()> {
    let mut shift = store.load_shift_settings();
    if let Some(center) = center {
        shift.shift_peak_center = center;
    }
    if let Some(x_min) = x_min {
        shift.x_min = x_min;
    }
    if let Some(x_max) = x_max {
        shift.x_max = x_max;
    }
    validate_window(&shift)?;

    let path = store.save_shift_settings(&shift)?;
    info!("Shift settings saved to {:?}", path);
    println!(
        "✓ Shift settings saved: center {:.2} eV, window {:.2} - {:.2} eV",
        shift.shift_peak_center, shift.x_min, shift.x_max
    );
    Ok(())
}
